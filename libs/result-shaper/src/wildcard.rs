//! Collapsing of date-sharded table families.
//!
//! Tables sharded by day (`sales_20230101`, `sales_20230102`, ...) are shown
//! as one `sales_YYYYMMDD` entry so they can be queried as a wildcard table.

use std::sync::LazyLock;

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;

use crate::metadata::{PARTITIONED_SUFFIX, ResultFormat};

/// Placeholder replacing the date shard in a collapsed entry.
pub const DATE_TEMPLATE: &str = "YYYYMMDD";

static DATE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(20\d{2})(\d{2})(\d{2})$").expect("valid date suffix regex"));

/// True when `id` ends in `_YYYYMMDD` naming a real calendar day in 2000–2099.
///
/// Day-of-month is checked against the month length, February 29th only in
/// leap years.
pub fn has_date_suffix(id: &str) -> bool {
    let Some(caps) = DATE_SUFFIX_RE.captures(id) else {
        return false;
    };
    let year = caps[1].parse::<i32>();
    let month = caps[2].parse::<u32>();
    let day = caps[3].parse::<u32>();
    match (year, month, day) {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
        _ => false,
    }
}

/// Strip the partition marker and anything after it from a display label.
fn strip_partition_marker(text: &str) -> &str {
    match text.find(PARTITIONED_SUFFIX) {
        Some(pos) => &text[..pos],
        None => text,
    }
}

/// `sales_20230101` → `sales_YYYYMMDD`.
fn template_key(text: &str, value: &str) -> String {
    let base = text
        .len()
        .checked_sub(DATE_TEMPLATE.len())
        .and_then(|end| text.get(..end))
        .or_else(|| value.get(..value.len() - DATE_TEMPLATE.len()))
        .unwrap_or_default();
    format!("{base}{DATE_TEMPLATE}")
}

/// Collapse date-sharded siblings into one templated entry each.
///
/// Entries without a date shard stay keyed by their identifier. Output
/// follows first-insertion order of keys; a repeated key keeps its position
/// and takes the most recent label.
pub fn consolidate_wildcard_tables(tables: Vec<ResultFormat>) -> Vec<ResultFormat> {
    let mut by_key: IndexMap<String, String> = IndexMap::with_capacity(tables.len());

    for table in tables {
        let text = strip_partition_marker(&table.text);
        if has_date_suffix(&table.value) {
            let key = template_key(text, &table.value);
            by_key.insert(key.clone(), key);
        } else {
            by_key.insert(table.value, text.to_string());
        }
    }

    tracing::debug!(entries = by_key.len(), "wildcard tables consolidated");

    by_key
        .into_iter()
        .map(|(value, text)| ResultFormat { text, value })
        .collect()
}
