use std::path::Path;

use clap::{Args, Parser, Subcommand};
use result_shaper::{FieldType, QueryFormat};
use serde::Deserialize;

use crate::error::CliError;

pub const DEFAULT_CONFIG_PATH: &str = "result-shaper.toml";

#[derive(Parser)]
#[command(name = "result-shaper", about = "Shape warehouse query results for dashboards")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, env = "RESULT_SHAPER_CONFIG", global = true)]
    pub config: String,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Project picker entries from a projects.list response
    Projects(InputArgs),
    /// Dataset picker entries from a datasets.list response
    Datasets(InputArgs),
    /// Table picker entries, date-sharded tables collapsed
    Tables(InputArgs),
    /// Flattened field picker entries from a table schema
    Fields(FieldsArgs),
    /// Time series or table from a query response
    Query(QueryArgs),
    /// Annotation events from a rendered annotation response
    Annotations(AnnotationArgs),
}

#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// JSON input file; stdin when omitted or "-"
    pub input: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Keep only fields of these types (repeatable)
    #[arg(long = "filter")]
    pub filter: Vec<String>,
}

#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format: time_series or table
    #[arg(long, env = "RESULT_SHAPER_FORMAT")]
    pub format: Option<QueryFormat>,
}

#[derive(Args, Clone, Debug)]
pub struct AnnotationArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Annotation options file (`{"annotation": {...}}`)
    #[arg(long, conflicts_with = "name")]
    pub options: Option<String>,

    /// Annotation query name, when no options file is given
    #[arg(long)]
    pub name: Option<String>,
}

// ---- TOML Config ----

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub format: Option<QueryFormat>,
    #[serde(default)]
    pub field_filter: Vec<String>,
    pub annotation_name: Option<String>,
    pub pretty: Option<bool>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            context: "read",
            detail: format!("'{path}': {e}"),
        })?;
        toml::from_str(&content).map_err(|e| CliError::Config {
            context: "parse",
            detail: format!("'{path}': {e}"),
        })
    }

    /// Load the config named on the command line. Only the default path may
    /// be absent.
    pub fn resolve(path: &str) -> Result<Self, CliError> {
        Self::load_from(path, path != DEFAULT_CONFIG_PATH)
    }

    fn load_from(path: &str, required: bool) -> Result<Self, CliError> {
        if !required && !Path::new(path).exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Settings after merging: config file < env / CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct Effective {
    pub format: QueryFormat,
    pub field_filter: Vec<FieldType>,
    pub annotation_name: Option<String>,
    pub pretty: bool,
}

impl Effective {
    pub fn new(global: &GlobalArgs, command: &Commands, cfg: Config) -> Self {
        let (format, filter, name) = match command {
            Commands::Query(a) => (a.format, Vec::new(), None),
            Commands::Fields(a) => (None, a.filter.clone(), None),
            Commands::Annotations(a) => (None, Vec::new(), a.name.clone()),
            _ => (None, Vec::new(), None),
        };

        let filter = if filter.is_empty() { cfg.field_filter } else { filter };

        Self {
            format: format.or(cfg.format).unwrap_or_default(),
            field_filter: filter.into_iter().map(FieldType::from).collect(),
            annotation_name: name.or(cfg.annotation_name),
            pretty: global.pretty || cfg.pretty.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn global(config: &str, pretty: bool) -> GlobalArgs {
        GlobalArgs { config: config.to_string(), pretty }
    }

    #[test]
    fn optional_config_may_be_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result-shaper.toml");
        let cfg = Config::load_from(path.to_str().unwrap(), false).unwrap();
        assert!(cfg.format.is_none());
        assert!(cfg.field_filter.is_empty());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::resolve(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CliError::Config { context: "read", .. }));
    }

    #[test]
    fn cli_overrides_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "format = \"time_series\"\nfield_filter = [\"INT64\"]\nannotation_name = \"deploys\"\npretty = true"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cfg = Config::load(&path).unwrap();

        let cmd = Commands::Query(QueryArgs {
            input: InputArgs { input: None },
            format: Some(QueryFormat::Table),
        });
        let eff = Effective::new(&global(&path, false), &cmd, cfg);
        assert_eq!(eff.format, QueryFormat::Table);
        assert_eq!(eff.field_filter, vec![FieldType::Int64]);
        assert_eq!(eff.annotation_name.as_deref(), Some("deploys"));
        assert!(eff.pretty);
    }

    #[test]
    fn config_fills_gaps() {
        let cfg: Config = toml::from_str("format = \"time_series\"").unwrap();
        let cmd = Commands::Fields(FieldsArgs {
            input: InputArgs { input: None },
            filter: vec!["FLOAT64".into()],
        });
        let eff = Effective::new(&global(DEFAULT_CONFIG_PATH, true), &cmd, cfg);
        assert_eq!(eff.format, QueryFormat::TimeSeries);
        assert_eq!(eff.field_filter, vec![FieldType::Float64]);
        assert!(eff.pretty);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        assert!(toml::from_str::<Config>("colour = \"red\"").is_err());
    }
}
