use serde::{Serialize, Serializer};

use crate::result::QueryResult;
use crate::schema::FieldType;
use crate::value::{CellValue, coerce_value};

/// Column header: field name and its type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub text: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Generic table shape, serialized with `"type": "table"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Table", 3)?;
        s.serialize_field("columns", &self.columns)?;
        s.serialize_field("rows", &self.rows)?;
        s.serialize_field("type", "table")?;
        s.end()
    }
}

/// Rebuild the result as a table.
///
/// Columns mirror the top-level schema one to one, records included as
/// single columns. Every cell is coerced with the type of the column at its
/// position; cells past the last column pass through raw. A `null` row
/// becomes an empty row.
pub fn to_table(result: &QueryResult) -> Table {
    let columns: Vec<Column> = result
        .schema
        .fields
        .iter()
        .map(|f| Column {
            text: f.name.clone(),
            field_type: f.field_type.clone(),
        })
        .collect();

    let rows = result
        .rows
        .iter()
        .flatten()
        .map(|row| match row {
            Some(row) => row
                .f
                .iter()
                .enumerate()
                .map(|(i, cell)| match columns.get(i) {
                    Some(col) => coerce_value(&cell.v, &col.field_type),
                    None => CellValue::Raw(cell.v.clone()),
                })
                .collect(),
            None => Vec::new(),
        })
        .collect();

    Table { columns, rows }
}
