use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::schema::FieldType;

/// Rendering used for temporal cells, always in UTC.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// Rendering used when the epoch does not map to a representable instant.
pub const INVALID_TIMESTAMP: &str = "Invalid Date";

/// A cell after coercion against its column type.
///
/// Strategy by type:
/// - numeric tags: parsed once into `f64`; unparseable input becomes NaN
///   (serialized as `null`)
/// - temporal tags: seconds since epoch rendered as a date-time string
/// - everything else: the raw JSON value, untouched
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Numeric(f64),
    Temporal(String),
    Raw(Value),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Numeric(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Temporal(s) => Some(s),
            CellValue::Raw(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Numeric(n) => serializer.serialize_f64(*n),
            CellValue::Temporal(s) => serializer.serialize_str(s),
            CellValue::Raw(v) => v.serialize(serializer),
        }
    }
}

/// Coerce a raw cell against its column type.
pub fn coerce_value(raw: &Value, field_type: &FieldType) -> CellValue {
    if field_type.is_numeric() {
        return CellValue::Numeric(to_number(raw));
    }
    if field_type.is_temporal() {
        return CellValue::Temporal(format_epoch_seconds(to_number(raw)));
    }
    CellValue::Raw(raw.clone())
}

/// Loose numeric conversion of a raw JSON scalar.
///
/// - numbers: as-is
/// - strings: trimmed; empty → 0, otherwise parsed (NaN on failure)
/// - `null` → 0, booleans → 1 / 0
/// - arrays and objects → NaN
pub fn to_number(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Render whole seconds since epoch as a human-readable UTC timestamp.
pub fn format_epoch_seconds(seconds: f64) -> String {
    let millis = seconds * 1000.0;
    if !millis.is_finite() {
        return INVALID_TIMESTAMP.to_string();
    }
    // Sub-millisecond precision is dropped.
    match DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64) {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => INVALID_TIMESTAMP.to_string(),
    }
}

/// Display form of a raw value used for labels and series names.
pub fn value_to_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether a raw value counts as present: not null, false, empty or zero.
pub(crate) fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::Array(_) | Value::Object(_) => true,
    }
}
