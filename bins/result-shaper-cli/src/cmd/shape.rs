use std::io::{Read, Write};

use result_shaper::{
    AnnotationOptions, AnnotationResponse, Field, QueryResult, parse_data_query, parse_datasets,
    parse_projects, parse_table_fields, parse_tables, to_annotations,
};
use serde::Serialize;
use serde_json::Value;

use crate::config::{Commands, Effective, InputArgs};
use crate::error::CliError;

// ═══════════════════════════════════════════════════════════════
//  Entry point
// ═══════════════════════════════════════════════════════════════

pub fn run(eff: &Effective, command: &Commands) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let shaped = shape(eff, command)?;
    write_json(&mut out, &shaped, eff.pretty)?;
    Ok(())
}

/// Run one shaping command and return its JSON output.
pub fn shape(eff: &Effective, command: &Commands) -> Result<Value, CliError> {
    match command {
        Commands::Projects(args) => {
            let items = list_items(read_input(args)?, "projects")?;
            to_json(parse_projects(&items)?)
        }
        Commands::Datasets(args) => {
            let items = list_items(read_input(args)?, "datasets")?;
            to_json(parse_datasets(&items)?)
        }
        Commands::Tables(args) => {
            let items = list_items(read_input(args)?, "tables")?;
            to_json(parse_tables(&items)?)
        }
        Commands::Fields(args) => {
            let fields = schema_fields(read_input(&args.input)?)?;
            to_json(parse_table_fields(&fields, &eff.field_filter))
        }
        Commands::Query(args) => {
            let result: QueryResult = serde_json::from_value(read_input(&args.input)?)?;
            tracing::debug!(format = %eff.format, "shaping query result");
            to_json(parse_data_query(&result, eff.format)?)
        }
        Commands::Annotations(args) => {
            let options = annotation_options(args.options.as_deref(), eff.annotation_name.as_deref())?;
            let response: AnnotationResponse = serde_json::from_value(read_input(&args.input)?)?;
            to_json(to_annotations(&options, &response)?)
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Input helpers
// ═══════════════════════════════════════════════════════════════

fn read_input(args: &InputArgs) -> Result<Value, CliError> {
    let raw = match args.input.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("'{path}': {e}")))?,
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Accept either a bare array or a list response wrapping it under `member`.
fn list_items(input: Value, member: &str) -> Result<Vec<Value>, CliError> {
    match input {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(member) {
            Some(Value::Array(items)) => Ok(items),
            // List responses omit the member when there is nothing to list.
            None => Ok(Vec::new()),
            Some(other) => Err(CliError::Input(format!(
                "'{member}' must be an array, got {other}"
            ))),
        },
        other => Err(CliError::Input(format!("expected array or object, got {other}"))),
    }
}

/// Accept a bare field array, a `{"fields": [...]}` schema or a table
/// resource with `{"schema": {"fields": [...]}}`.
fn schema_fields(input: Value) -> Result<Vec<Field>, CliError> {
    let fields = match input {
        Value::Object(mut map) => match map.remove("schema") {
            Some(mut schema) => schema.get_mut("fields").map(Value::take),
            None => map.remove("fields"),
        },
        array @ Value::Array(_) => Some(array),
        _ => None,
    };
    match fields {
        Some(fields) => Ok(serde_json::from_value(fields)?),
        None => Ok(Vec::new()),
    }
}

fn annotation_options(path: Option<&str>, name: Option<&str>) -> Result<AnnotationOptions, CliError> {
    if let Some(path) = path {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("'{path}': {e}")))?;
        return Ok(serde_json::from_str(&raw)?);
    }
    let name = name.ok_or_else(|| {
        CliError::Input("annotations need --options or --name (or annotation_name in config)".into())
    })?;
    Ok(AnnotationOptions {
        annotation: serde_json::json!({ "name": name }),
    })
}

// ═══════════════════════════════════════════════════════════════
//  Output helpers
// ═══════════════════════════════════════════════════════════════

fn to_json<T: Serialize>(shaped: T) -> Result<Value, CliError> {
    Ok(serde_json::to_value(shaped)?)
}

fn write_json(out: &mut impl Write, value: &Value, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
