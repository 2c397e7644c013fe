use crate::error::ConfigError;
use crate::graph::BuildOptions;
use crate::ontology::CertificateMode;
use crate::report::{Catalog, DEFAULT_WOMEN_THRESHOLD, OutputFormat, load_catalog_file};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_DELIMITER: &str = ", ";

/// What the process was asked to do, with its paths resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// CSV to Turtle
    Build { input: PathBuf, output: PathBuf },
    /// Turtle to reports
    Report { graph: PathBuf },
    /// CSV to reports, optionally persisting the graph on the way
    Run {
        input: PathBuf,
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub task: Task,
    pub certificate_mode: CertificateMode,
    pub delimiter: String,
    pub women_threshold: f64,
    pub format: OutputFormat,
    pub catalog: Option<PathBuf>,
}

impl PipelineConfig {
    /// Merge CLI arguments over the optional config file over defaults.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            certificate_mode: cli_certificate_mode,
            delimiter: cli_delimiter,
            women_threshold: cli_women_threshold,
            format: cli_format,
            catalog: cli_catalog,
            command,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)
                .with_context(|| format!("failed to load config file {:?}", path))?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            certificate_mode: file_certificate_mode,
            delimiter: file_delimiter,
            women_threshold: file_women_threshold,
            format: file_format,
            catalog: file_catalog,
        } = file_config;

        let task = match command {
            Command::Build { input, output } => Task::Build { input, output },
            Command::Report { graph } => Task::Report { graph },
            Command::Run { input, output } => Task::Run { input, output },
        };

        Ok(Self {
            task,
            certificate_mode: cli_certificate_mode
                .or(file_certificate_mode)
                .unwrap_or_default(),
            delimiter: cli_delimiter
                .or(file_delimiter)
                .unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
            women_threshold: cli_women_threshold
                .or(file_women_threshold)
                .unwrap_or(DEFAULT_WOMEN_THRESHOLD),
            format: cli_format.or(file_format).unwrap_or_default(),
            catalog: cli_catalog.or(file_catalog),
        })
    }

    /// Fail fast on settings that would only surface mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::Invalid("delimiter must not be empty".into()));
        }
        if !self.women_threshold.is_finite() || !(0.0..=100.0).contains(&self.women_threshold) {
            return Err(ConfigError::Invalid(format!(
                "women threshold must be a percentage between 0 and 100, got {}",
                self.women_threshold
            )));
        }
        if let Some(catalog) = self.catalog.as_ref() {
            if !catalog.is_file() {
                return Err(ConfigError::MissingFile(catalog.clone()));
            }
        }
        let same_file = match &self.task {
            Task::Build { input, output } => input == output,
            Task::Run {
                input,
                output: Some(output),
            } => input == output,
            _ => false,
        };
        if same_file {
            return Err(ConfigError::Invalid(
                "graph output would overwrite the input table".into(),
            ));
        }
        Ok(())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            certificate_mode: self.certificate_mode,
        }
    }

    /// Default catalog with the configured threshold, extended by the
    /// catalog file if one is configured.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        let mut catalog = Catalog::default_catalog(self.women_threshold);
        if let Some(path) = self.catalog.as_ref() {
            catalog.extend(load_catalog_file(path)?);
        }
        Ok(catalog)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "supplygraph",
    about = "Build an RDF graph from a supplier table and run compliance reports",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SUPPLYGRAPH_CERTIFICATE_MODE",
        value_enum,
        value_name = "MODE",
        help = "How certificate references are reconciled (faithful or unified)",
        global = true
    )]
    pub certificate_mode: Option<CertificateMode>,

    #[arg(
        long,
        env = "SUPPLYGRAPH_DELIMITER",
        value_name = "TEXT",
        help = "Field delimiter for text reports",
        global = true
    )]
    pub delimiter: Option<String>,

    #[arg(
        long,
        env = "SUPPLYGRAPH_WOMEN_THRESHOLD",
        value_name = "PERCENT",
        help = "Threshold for the women-majority report",
        value_parser = clap::value_parser!(f64),
        global = true
    )]
    pub women_threshold: Option<f64>,

    #[arg(
        long,
        env = "SUPPLYGRAPH_FORMAT",
        value_enum,
        value_name = "FORMAT",
        help = "Report output format (text or json)",
        global = true
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        long,
        env = "SUPPLYGRAPH_CATALOG",
        value_name = "FILE",
        help = "Extra report queries (YAML or JSON), overriding built-ins by name",
        global = true
    )]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Convert a supplier CSV into a Turtle graph
    Build {
        #[arg(long, value_name = "CSV")]
        input: PathBuf,
        #[arg(long, value_name = "TTL")]
        output: PathBuf,
    },
    /// Run the report catalog over a persisted graph
    Report {
        #[arg(long, value_name = "TTL")]
        graph: PathBuf,
    },
    /// Build in memory and report in one go
    Run {
        #[arg(long, value_name = "CSV")]
        input: PathBuf,
        #[arg(long, value_name = "TTL")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    certificate_mode: Option<CertificateMode>,
    delimiter: Option<String>,
    women_threshold: Option<f64>,
    format: Option<OutputFormat>,
    catalog: Option<PathBuf>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("failed to read {:?}: {e}", path)))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::Invalid(format!("failed to parse YAML config: {e}"))),
        "json" => serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Invalid(format!("failed to parse JSON config: {e}"))),
        other => Err(ConfigError::UnsupportedExtension(other.to_string())),
    }
}
