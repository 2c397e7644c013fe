//! Turtle persistence for supplier graphs.

use super::SupplierGraph;
use crate::error::{GraphLoadError, GraphWriteError};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Serialize `graph` as Turtle and write it to `path`, creating parent
/// directories as needed.
pub fn write_turtle(graph: &SupplierGraph, path: &Path) -> Result<usize, GraphWriteError> {
    let start = Instant::now();
    let turtle = graph.to_turtle()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| GraphWriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, turtle.as_bytes()).map_err(|source| GraphWriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        bytes = turtle.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "graph written"
    );
    Ok(turtle.len())
}

/// Load a graph previously written with [`write_turtle`].
///
/// # Errors
///
/// Fails when the file is missing, unreadable or not valid Turtle. Report
/// runs treat any of these as fatal before a single query executes.
pub fn load_turtle(path: &Path) -> Result<SupplierGraph, GraphLoadError> {
    if !path.exists() {
        return Err(GraphLoadError::NotFound(path.to_path_buf()));
    }
    let start = Instant::now();
    let content = fs::read_to_string(path).map_err(|source| GraphLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = SupplierGraph::from_turtle(&content)?;

    tracing::info!(
        path = %path.display(),
        statements = graph.len()?,
        duration_ms = start.elapsed().as_millis() as u64,
        "graph loaded"
    );
    Ok(graph)
}
