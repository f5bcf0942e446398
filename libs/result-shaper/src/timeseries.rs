use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::result::QueryResult;
use crate::schema::Field;
use crate::value::{to_number, value_to_text};

/// Name of the column that splits rows into separate series.
pub const METRIC_COLUMN: &str = "metric";

/// Series name used when the result has no numeric column to name it after.
pub const DEFAULT_SERIES_NAME: &str = "value";

/// `[value, epoch_millis]`, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Datapoint(pub f64, pub f64);

impl Datapoint {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn epoch_millis(&self) -> f64 {
        self.1
    }
}

/// One named series. `ref_id` and `query` are filled in by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTarget {
    pub target: String,
    pub datapoints: Vec<Datapoint>,
    pub ref_id: String,
    pub query: String,
}

impl DataTarget {
    fn new(target: String) -> Self {
        Self {
            target,
            datapoints: Vec::new(),
            ref_id: String::new(),
            query: String::new(),
        }
    }
}

/// Column positions picked from the schema for series construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColumns {
    pub time: usize,
    pub metric: Option<usize>,
    pub value: Option<usize>,
}

impl SeriesColumns {
    /// Single pass over the schema: first temporal field, first field named
    /// `metric`, first numeric field.
    pub fn locate(fields: &[Field]) -> Result<Self, ShapeError> {
        let mut time = None;
        let mut metric = None;
        let mut value = None;
        for (i, field) in fields.iter().enumerate() {
            if time.is_none() && field.field_type.is_temporal() {
                time = Some(i);
            }
            if metric.is_none() && field.name == METRIC_COLUMN {
                metric = Some(i);
            }
            if value.is_none() && field.field_type.is_numeric() {
                value = Some(i);
            }
        }
        let time = time.ok_or_else(ShapeError::no_datetime_column)?;
        Ok(Self { time, metric, value })
    }
}

/// Group rows into named series of `[value, epoch_millis]` points.
///
/// Series appear in the order their name is first seen and points keep row
/// order; nothing is re-sorted. `null` rows are skipped.
pub fn to_time_series(result: &QueryResult) -> Result<Vec<DataTarget>, ShapeError> {
    let fields = &result.schema.fields;
    let cols = SeriesColumns::locate(fields)?;

    let fallback_name = cols
        .value
        .map_or(DEFAULT_SERIES_NAME, |i| fields[i].name.as_str());

    let mut buckets: IndexMap<String, DataTarget> = IndexMap::new();
    let mut skipped = 0usize;

    for row in result.rows.iter().flatten() {
        let Some(row) = row else {
            skipped += 1;
            continue;
        };

        let epoch = to_number(row.value(cols.time)) * 1000.0;
        let name = match cols.metric {
            Some(i) => value_to_text(row.value(i)),
            None => fallback_name.to_string(),
        };
        let value = cols.value.map_or(f64::NAN, |i| to_number(row.value(i)));

        let bucket = match buckets.entry(name) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                tracing::trace!(series = %e.key(), "new series bucket");
                let target = DataTarget::new(e.key().clone());
                e.insert(target)
            }
        };
        bucket.datapoints.push(Datapoint(value, epoch));
    }

    tracing::debug!(series = buckets.len(), skipped, "time series built");
    Ok(buckets.into_values().collect())
}
