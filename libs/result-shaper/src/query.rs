use serde::{Deserialize, Serialize, Serializer};

use crate::error::ShapeError;
use crate::result::QueryResult;
use crate::table::{Table, to_table};
use crate::timeseries::{DataTarget, to_time_series};

/// Output shape requested for a data query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFormat {
    TimeSeries,
    #[default]
    Table,
}

impl std::str::FromStr for QueryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time_series" => Ok(QueryFormat::TimeSeries),
            "table" => Ok(QueryFormat::Table),
            other => Err(format!("unknown format '{other}', expected time_series or table")),
        }
    }
}

impl std::fmt::Display for QueryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryFormat::TimeSeries => write!(f, "time_series"),
            QueryFormat::Table => write!(f, "table"),
        }
    }
}

/// Shaped data query output.
///
/// `Empty` serializes as `{"data": []}`, the other variants as their inner
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub enum DataResponse {
    Empty,
    TimeSeries(Vec<DataTarget>),
    Table(Table),
}

impl Serialize for DataResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        match self {
            DataResponse::Empty => {
                let mut s = serializer.serialize_struct("DataResponse", 1)?;
                s.serialize_field("data", &[] as &[DataTarget])?;
                s.end()
            }
            DataResponse::TimeSeries(series) => series.serialize(serializer),
            DataResponse::Table(table) => table.serialize(serializer),
        }
    }
}

/// Shape a query result in the requested format.
///
/// A result without a `rows` member short-circuits to [`DataResponse::Empty`]
/// before any schema validation.
pub fn parse_data_query(result: &QueryResult, format: QueryFormat) -> Result<DataResponse, ShapeError> {
    if result.rows.is_none() {
        return Ok(DataResponse::Empty);
    }
    match format {
        QueryFormat::TimeSeries => to_time_series(result).map(DataResponse::TimeSeries),
        QueryFormat::Table => Ok(DataResponse::Table(to_table(result))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn format_parses_from_wire_names() {
        assert_eq!("time_series".parse::<QueryFormat>().unwrap(), QueryFormat::TimeSeries);
        assert_eq!("table".parse::<QueryFormat>().unwrap(), QueryFormat::Table);
        assert!("graph".parse::<QueryFormat>().is_err());
        let f: QueryFormat = serde_json::from_value(json!("time_series")).unwrap();
        assert_eq!(f, QueryFormat::TimeSeries);
    }

    #[test]
    fn no_rows_member_is_empty_data() {
        // No time column either: the missing rows short-circuit first.
        let result: QueryResult =
            serde_json::from_value(json!({"schema": {"fields": [{"name": "x", "type": "STRING"}]}})).unwrap();
        let resp = parse_data_query(&result, QueryFormat::TimeSeries).unwrap();
        assert_eq!(resp, DataResponse::Empty);
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({"data": []}));
    }

    #[test]
    fn dispatches_on_format() {
        let result: QueryResult = serde_json::from_value(json!({
            "schema": {"fields": [{"name": "ts", "type": "TIMESTAMP"}, {"name": "v", "type": "INT64"}]},
            "rows": [{"f": [{"v": "1"}, {"v": "2"}]}]
        }))
        .unwrap();

        let ts = parse_data_query(&result, QueryFormat::TimeSeries).unwrap();
        assert_eq!(
            serde_json::to_value(&ts).unwrap(),
            json!([{"target": "v", "datapoints": [[2.0, 1000.0]], "refId": "", "query": ""}])
        );

        let table = parse_data_query(&result, QueryFormat::Table).unwrap();
        assert!(matches!(table, DataResponse::Table(ref t) if t.rows.len() == 1));
    }
}
