use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ShapeError;
use crate::path::resolve_path;
use crate::value::{is_truthy, to_number, value_to_text};

static TAG_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("valid tag separator regex"));

/// Annotation request from the host. `annotation` is passed through to every
/// emitted event; its `name` selects the result to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationOptions {
    pub annotation: Value,
}

/// Host response envelope: `{"data": {"results": {<name>: {"tables": [...]}}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResponse {
    #[serde(default)]
    pub data: ResponseData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(default)]
    pub results: HashMap<String, ResultTables>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTables {
    #[serde(default)]
    pub tables: Vec<TableData>,
}

/// Already-rendered table: column headers plus positional row values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub columns: Vec<ColumnHeader>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEvent {
    pub annotation: Value,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    pub time: i64,
    /// Never populated: no column is mapped to the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
}

#[derive(Debug, Default)]
struct AnnotationColumns {
    time: Option<usize>,
    text: Option<usize>,
    tags: Option<usize>,
}

impl AnnotationColumns {
    fn locate(columns: &[ColumnHeader]) -> Self {
        let mut cols = Self::default();
        for (i, col) in columns.iter().enumerate() {
            match col.text.as_str() {
                "time" => cols.time = Some(i),
                "text" => cols.text = Some(i),
                "tags" => cols.tags = Some(i),
                _ => {}
            }
        }
        cols
    }
}

/// Turn the first table of the named annotation result into events.
///
/// Fails with [`ShapeError::MissingTimeColumn`] when the table has no `time`
/// column. A result or table that is not there yields no events.
pub fn to_annotations(
    options: &AnnotationOptions,
    response: &AnnotationResponse,
) -> Result<Vec<AnnotationEvent>, ShapeError> {
    let name = value_to_text(resolve_path(&options.annotation, "name")?);

    let Some(table) = response
        .data
        .results
        .get(&name)
        .and_then(|r| r.tables.first())
    else {
        tracing::warn!(annotation = %name, "no result table for annotation query");
        return Ok(Vec::new());
    };

    let cols = AnnotationColumns::locate(&table.columns);
    let time_idx = cols.time.ok_or_else(ShapeError::no_annotation_time_column)?;

    let events = table
        .rows
        .iter()
        .map(|row| AnnotationEvent {
            annotation: options.annotation.clone(),
            tags: cols
                .tags
                .and_then(|i| row.get(i))
                .map(split_tags)
                .unwrap_or_default(),
            text: cols.text.and_then(|i| row.get(i)).cloned(),
            time: row.get(time_idx).map_or(0, |v| to_number(v).floor() as i64),
            title: None,
        })
        .collect::<Vec<_>>();

    tracing::debug!(annotation = %name, events = events.len(), "annotations extracted");
    Ok(events)
}

/// `" a, b ,c "` → `["a", "b", "c"]`; an empty or missing cell → `[]`.
pub fn split_tags(cell: &Value) -> Vec<String> {
    if !is_truthy(cell) {
        return Vec::new();
    }
    let raw = value_to_text(cell);
    TAG_SEPARATOR_RE
        .split(raw.trim())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn options() -> AnnotationOptions {
        AnnotationOptions {
            annotation: json!({"name": "deploys", "enable": true}),
        }
    }

    fn response(table: Value) -> AnnotationResponse {
        serde_json::from_value(json!({"data": {"results": {"deploys": {"tables": [table]}}}})).unwrap()
    }

    #[test]
    fn builds_events_in_row_order() {
        let resp = response(json!({
            "columns": [{"text": "time"}, {"text": "text"}, {"text": "tags"}, {"text": "title"}],
            "rows": [
                [1_700_000_000_123.9_f64, "release 1", "a, b,c", "T1"],
                [1_700_000_100_000_i64, "release 2", null, "T2"]
            ]
        }));
        let events = to_annotations(&options(), &resp).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].time, 1_700_000_000_123);
        assert_eq!(events[0].tags, ["a", "b", "c"]);
        assert_eq!(events[0].text, Some(json!("release 1")));
        assert_eq!(events[0].title, None);
        assert_eq!(events[0].annotation, options().annotation);

        assert_eq!(events[1].time, 1_700_000_100_000);
        assert!(events[1].tags.is_empty());
    }

    #[test]
    fn missing_time_column_fails() {
        let resp = response(json!({"columns": [{"text": "text"}], "rows": [["x"]]}));
        let err = to_annotations(&options(), &resp).unwrap_err();
        assert!(err.is_missing_time_column());
        assert_eq!(err.to_string(), "Missing mandatory time column in annotation query.");
    }

    #[test]
    fn unknown_result_yields_no_events() {
        let events = to_annotations(&options(), &AnnotationResponse::default()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn tag_splitting() {
        assert_eq!(split_tags(&json!("  prod ,  eu-west ")), ["prod", "eu-west"]);
        assert_eq!(split_tags(&json!("solo")), ["solo"]);
        assert!(split_tags(&json!("")).is_empty());
        assert!(split_tags(&json!(null)).is_empty());
    }

    #[test]
    fn absent_text_and_title_are_omitted() {
        let resp = response(json!({"columns": [{"text": "time"}], "rows": [["42.7"]]}));
        let events = to_annotations(&options(), &resp).unwrap();
        assert_eq!(
            serde_json::to_value(&events[0]).unwrap(),
            json!({"annotation": {"name": "deploys", "enable": true}, "tags": [], "time": 42})
        );
    }
}
