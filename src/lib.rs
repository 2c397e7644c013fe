pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod model;
pub mod ontology;
pub mod report;
pub mod sparql;
pub mod table;

pub use config::{CliArgs, Command, PipelineConfig, Task};
pub use error::{
    BuildError, ConfigError, ErrorCode, GraphLoadError, GraphWriteError, ReportError, TableError,
};
pub use graph::{BuildOptions, BuildStats, GraphBuilder, SupplierGraph, load_turtle, write_turtle};
pub use logging::{LoggingConfig, init_logging};
pub use model::{CellValue, EntityId, SupplierRecord};
pub use ontology::CertificateMode;
pub use report::{Catalog, OutputFormat, QueryOutcome, ReportEngine, run_reports};

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// What a pipeline run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub build: Option<BuildStats>,
    pub queries: usize,
    pub failed_queries: usize,
}

/// Read the supplier table at `input` and build its graph.
pub fn build_from_csv(input: &Path, options: BuildOptions) -> Result<(SupplierGraph, BuildStats)> {
    let rows = table::read_suppliers(input)
        .with_context(|| format!("failed to read supplier table {:?}", input))?;
    let built = GraphBuilder::new(options)
        .build(&rows)
        .context("failed to build the supplier graph")?;
    Ok(built)
}

/// Execute the configured task, writing reports to `out`.
///
/// Graph loading and building failures abort the run. Individual query
/// failures do not: they are rendered in place and counted in the summary.
pub fn run<W: Write>(config: &PipelineConfig, out: &mut W) -> Result<RunSummary> {
    config.validate()?;
    tracing::info!(
        task = ?config.task,
        certificate_mode = %config.certificate_mode,
        format = %config.format,
        "starting supplygraph"
    );

    match &config.task {
        Task::Build { input, output } => {
            let (graph, stats) = build_from_csv(input, config.build_options())?;
            write_turtle(&graph, output)
                .with_context(|| format!("failed to write graph to {:?}", output))?;
            Ok(RunSummary {
                build: Some(stats),
                ..RunSummary::default()
            })
        }
        Task::Report { graph } => {
            // Loaded before the catalog runs: a bad graph file fails the
            // whole run without executing any query.
            let graph = load_turtle(graph)
                .with_context(|| format!("failed to load graph {:?}", graph))?;
            run_catalog(config, &graph, out, None)
        }
        Task::Run { input, output } => {
            let (graph, stats) = build_from_csv(input, config.build_options())?;
            if let Some(output) = output {
                write_turtle(&graph, output)
                    .with_context(|| format!("failed to write graph to {:?}", output))?;
            }
            run_catalog(config, &graph, out, Some(stats))
        }
    }
}

fn run_catalog<W: Write>(
    config: &PipelineConfig,
    graph: &SupplierGraph,
    out: &mut W,
    build: Option<BuildStats>,
) -> Result<RunSummary> {
    let catalog = config.catalog()?;
    let outcomes = run_reports(graph, &catalog);
    report::render(&outcomes, config.format, &config.delimiter, out)
        .context("failed to write report output")?;

    Ok(RunSummary {
        build,
        queries: outcomes.len(),
        failed_queries: outcomes.iter().filter(|o| !o.is_ok()).count(),
    })
}
