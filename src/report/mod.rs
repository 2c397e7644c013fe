//! Report Engine: a catalog of read-only SELECT queries, their execution
//! against a [`SupplierGraph`](crate::graph::SupplierGraph) and rendering.

pub mod catalog;
pub mod engine;
pub mod render;

pub use catalog::{
    Catalog, DEFAULT_WOMEN_THRESHOLD, QueryKind, QuerySpec, ResultShape, load_catalog_file,
};
pub use engine::{QueryOutcome, ReportEngine, run_reports};
pub use render::{OutputFormat, render, render_text};
