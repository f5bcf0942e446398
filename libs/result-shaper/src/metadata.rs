use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ShapeError;
use crate::path::{resolve_path, resolve_path_mut};
use crate::schema::{Field, FieldType, flatten_fields, select_fields};
use crate::value::{is_truthy, value_to_text};
use crate::wildcard::consolidate_wildcard_tables;

/// Discriminator the warehouse puts on table resources.
pub const TABLE_KIND: &str = "bigquery#table";

/// Suffix appended to the identifier of time-partitioned tables.
pub const PARTITIONED_SUFFIX: &str = "__partitioned";

const TABLE_ID_PATH: &str = "tableReference.tableId";

/// Picker entry: display label plus identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFormat {
    pub text: String,
    pub value: String,
}

impl ResultFormat {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Map every item to a [`ResultFormat`] by resolving two dotted paths.
///
/// Output has exactly one entry per input item, in input order. Table items
/// are normalized first, see [`normalize_item`].
pub fn extract_list(
    items: &[Value],
    text_path: &str,
    value_path: &str,
) -> Result<Vec<ResultFormat>, ShapeError> {
    items
        .iter()
        .map(|item| {
            let item = normalize_item(item)?;
            let text = resolve_path(&item, text_path)?;
            let value = resolve_path(&item, value_path)?;
            Ok(ResultFormat::new(value_to_text(text), value_to_text(value)))
        })
        .collect()
}

/// Rewrite the identifier of a time-partitioned table.
///
/// `events` partitioned on `created_at` becomes
/// `events__partitioned__created_at`; without a named partition field it
/// becomes `events__partitioned`. Any other item is borrowed unchanged.
pub fn normalize_item(item: &Value) -> Result<Cow<'_, Value>, ShapeError> {
    let is_table = item.get("kind").and_then(Value::as_str) == Some(TABLE_KIND);
    let partitioning = match item.get("timePartitioning") {
        Some(p) if is_table && is_truthy(p) => p,
        _ => return Ok(Cow::Borrowed(item)),
    };

    let mut suffix = PARTITIONED_SUFFIX.to_string();
    if let Some(field) = partitioning.get("field").filter(|f| is_truthy(f)) {
        suffix.push_str("__");
        suffix.push_str(&value_to_text(field));
    }

    let mut owned = item.clone();
    let table_id = resolve_path_mut(&mut owned, TABLE_ID_PATH)?;
    let rewritten = format!("{}{suffix}", value_to_text(table_id));
    tracing::trace!(table = %rewritten, "partitioned table identifier rewritten");
    *table_id = Value::String(rewritten);
    Ok(Cow::Owned(owned))
}

/// Project picker entries: `id` / `id`.
pub fn parse_projects(items: &[Value]) -> Result<Vec<ResultFormat>, ShapeError> {
    extract_list(items, "id", "id")
}

/// Dataset picker entries keyed by `datasetReference.datasetId`.
pub fn parse_datasets(items: &[Value]) -> Result<Vec<ResultFormat>, ShapeError> {
    extract_list(items, "datasetReference.datasetId", "datasetReference.datasetId")
}

/// Table picker entries, with date-sharded families collapsed.
pub fn parse_tables(items: &[Value]) -> Result<Vec<ResultFormat>, ShapeError> {
    let tables = extract_list(items, TABLE_ID_PATH, TABLE_ID_PATH)?;
    Ok(consolidate_wildcard_tables(tables))
}

/// Field picker entries: flattened leaf name as text, type tag as value.
pub fn parse_table_fields(fields: &[Field], filter: &[FieldType]) -> Vec<ResultFormat> {
    select_fields(flatten_fields(fields), filter)
        .into_iter()
        .map(|f| ResultFormat::new(f.name, f.field_type.as_str()))
        .collect()
}
