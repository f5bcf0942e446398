use std::fmt;

use serde::{Deserialize, Serialize};

/// Column type tag as reported by the warehouse schema.
///
/// Known tags are grouped into numeric, temporal and record categories.
/// Anything else is kept verbatim in [`FieldType::Other`] and passed through
/// untouched by coercion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Int64,
    Integer,
    Int,
    Numeric,
    Float64,
    Float,
    Date,
    DateTime,
    Timestamp,
    Record,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Int64 => "INT64",
            FieldType::Integer => "INTEGER",
            FieldType::Int => "INT",
            FieldType::Numeric => "NUMERIC",
            FieldType::Float64 => "FLOAT64",
            FieldType::Float => "FLOAT",
            FieldType::Date => "DATE",
            FieldType::DateTime => "DATETIME",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Record => "RECORD",
            FieldType::Other(s) => s,
        }
    }

    /// Integer-like and floating-like tags.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Int64
                | FieldType::Integer
                | FieldType::Int
                | FieldType::Numeric
                | FieldType::Float64
                | FieldType::Float
        )
    }

    /// Date/time-like tags. Raw values are whole seconds since epoch.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::DateTime | FieldType::Timestamp)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, FieldType::Record)
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s {
            "INT64" => FieldType::Int64,
            "INTEGER" => FieldType::Integer,
            "INT" => FieldType::Int,
            "NUMERIC" => FieldType::Numeric,
            "FLOAT64" => FieldType::Float64,
            "FLOAT" => FieldType::Float,
            "DATE" => FieldType::Date,
            "DATETIME" => FieldType::DateTime,
            "TIMESTAMP" => FieldType::Timestamp,
            "RECORD" => FieldType::Record,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match FieldType::from(s.as_str()) {
            FieldType::Other(_) => FieldType::Other(s),
            known => known,
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        match t {
            FieldType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single schema entry.
///
/// Record fields carry their children in `fields`; for every other type
/// `fields` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            mode: None,
            fields: Vec::new(),
        }
    }

    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Record,
            mode: None,
            fields,
        }
    }
}

/// Ordered list of top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A leaf field addressed by its full dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Flatten record fields into dotted leaf names, depth first.
///
/// `a` (RECORD) → `b` (RECORD) → `c` becomes a single `a.b.c` entry.
/// Depth is not capped; a record without children contributes nothing.
pub fn flatten_fields(fields: &[Field]) -> Vec<FlatField> {
    let mut out = Vec::new();
    flatten_into(fields, "", &mut out);
    out
}

fn flatten_into(fields: &[Field], prefix: &str, out: &mut Vec<FlatField>) {
    for field in fields {
        let name = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        if field.field_type.is_record() {
            flatten_into(&field.fields, &name, out);
        } else {
            out.push(FlatField {
                name,
                field_type: field.field_type.clone(),
            });
        }
    }
}

/// Keep flattened fields whose type matches any entry of `filter`.
///
/// An empty filter keeps everything.
pub fn select_fields(flattened: Vec<FlatField>, filter: &[FieldType]) -> Vec<FlatField> {
    if filter.is_empty() {
        return flattened;
    }
    flattened
        .into_iter()
        .filter(|f| filter.contains(&f.field_type))
        .collect()
}
