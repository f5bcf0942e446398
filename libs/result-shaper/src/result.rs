use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Schema;

static NULL: Value = Value::Null;

/// One cell of a row, in the warehouse wire shape `{"v": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub v: Value,
}

impl Cell {
    pub fn new(v: impl Into<Value>) -> Self {
        Self { v: v.into() }
    }
}

/// Positional cells, aligned with the top-level schema: `{"f": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub f: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Value>) -> Self {
        Self {
            f: cells.into_iter().map(|v| Cell { v }).collect(),
        }
    }

    /// Raw value at `index`; missing cells read as `null`.
    pub fn value(&self, index: usize) -> &Value {
        self.f.get(index).map_or(&NULL, |c| &c.v)
    }
}

/// Schema plus rows, as returned by the warehouse query API.
///
/// `rows` is `None` when the response carried no rows member at all, which
/// is distinct from an empty list. Individual rows may be `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub schema: Schema,
    #[serde(default)]
    pub rows: Option<Vec<Option<Row>>>,
}

impl QueryResult {
    /// Present rows in order, skipping `null` entries.
    pub fn present_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().flatten().flatten()
    }
}
