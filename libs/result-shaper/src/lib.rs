//! Shaping of schema-described warehouse query results.
//!
//! Every function here is pure and synchronous: it takes an already fetched
//! result (or metadata list) and returns a new shape for the host to render.
//!
//! - [`parse_data_query`], [`to_time_series`], [`to_table`]: row data
//! - [`parse_projects`], [`parse_datasets`], [`parse_tables`],
//!   [`parse_table_fields`]: picker lists
//! - [`to_annotations`]: annotation events from a rendered table

pub mod annotation;
pub mod error;
pub mod metadata;
pub mod path;
pub mod query;
pub mod result;
pub mod schema;
pub mod table;
pub mod timeseries;
pub mod value;
pub mod wildcard;

pub use annotation::{AnnotationEvent, AnnotationOptions, AnnotationResponse, to_annotations};
pub use error::ShapeError;
pub use metadata::{
    ResultFormat, extract_list, parse_datasets, parse_projects, parse_table_fields, parse_tables,
};
pub use query::{DataResponse, QueryFormat, parse_data_query};
pub use result::{Cell, QueryResult, Row};
pub use schema::{Field, FieldType, FlatField, Schema, flatten_fields, select_fields};
pub use table::{Column, Table, to_table};
pub use timeseries::{DataTarget, Datapoint, to_time_series};
pub use value::{CellValue, coerce_value};
pub use wildcard::consolidate_wildcard_tables;
