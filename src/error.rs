//! Error types for the supplier graph pipeline
//!
//! This module provides:
//! - One `thiserror` enum per pipeline stage (ingest, build, persistence, reports)
//! - Stable error codes and categories used for CLI exit statuses
//!
//! Build-time problems with individual cells never surface here: a missing
//! optional value simply produces no statement. Report-time failures are
//! reported per query and never abort the rest of the catalog.

use crate::sparql::BindingError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Stable error codes, used as process exit statuses by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Configuration could not be assembled or failed validation
    InvalidConfig = 2,
    /// Supplier table could not be read
    TableError = 3,
    /// Graph construction violated a vocabulary precondition
    BuildFailure = 4,
    /// Persisted graph is missing or malformed
    GraphLoadFailure = 5,
    /// Graph could not be serialized or written
    GraphWriteFailure = 6,
    /// At least one report query failed
    ReportFailure = 7,
    /// Anything else
    InternalError = 70,
}

impl ErrorCode {
    /// Get the integer code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get the error category for log fields
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::InvalidConfig => "config_error",
            ErrorCode::TableError => "input_error",
            ErrorCode::BuildFailure => "precondition_error",
            ErrorCode::GraphLoadFailure | ErrorCode::GraphWriteFailure => "io_error",
            ErrorCode::ReportFailure => "query_error",
            ErrorCode::InternalError => "internal_error",
        }
    }

    /// Map an `anyhow` chain to the most specific code it carries
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if cause.downcast_ref::<TableError>().is_some() {
                return ErrorCode::TableError;
            }
            if cause.downcast_ref::<BuildError>().is_some() {
                return ErrorCode::BuildFailure;
            }
            if cause.downcast_ref::<GraphLoadError>().is_some() {
                return ErrorCode::GraphLoadFailure;
            }
            if cause.downcast_ref::<GraphWriteError>().is_some() {
                return ErrorCode::GraphWriteFailure;
            }
            if cause.downcast_ref::<ReportError>().is_some() {
                return ErrorCode::ReportFailure;
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ErrorCode::InvalidConfig;
            }
        }
        ErrorCode::InternalError
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

// =============================================================================
// STAGE ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0:?} does not exist")]
    MissingFile(PathBuf),

    #[error("unsupported config extension: {0}")]
    UnsupportedExtension(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("supplier table {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read supplier table: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum BuildError {
    /// An instance statement pointed at a vocabulary entity that was never
    /// declared. This is a broken precondition, not a data problem.
    #[error("entity {subject} references undeclared vocabulary entry {reference}")]
    UnresolvedReference { subject: String, reference: String },

    #[error("'{0}' is not a valid IRI")]
    InvalidIri(String),

    #[error("graph storage error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),
}

#[derive(Debug, Error)]
pub enum GraphLoadError {
    #[error("graph file {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read graph file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse Turtle graph: {0}")]
    Parse(String),

    #[error("graph storage error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),
}

#[derive(Debug, Error)]
pub enum GraphWriteError {
    #[error("failed to serialize graph: {0}")]
    Serialize(String),

    #[error("failed to write graph file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("graph storage error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReportError {
    /// The denominator of a ratio report matched nothing
    #[error("division by zero in '{query}': denominator '{denominator}' is 0")]
    DivisionByZero { query: String, denominator: String },

    #[error("query evaluation failed: {0}")]
    Evaluation(String),

    #[error("parameter '{0}' is declared but not bound")]
    MissingParameter(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("query contains update keyword {0}; only read-only queries are allowed")]
    UnsafeQuery(String),

    #[error("query '{0}' did not return a solution table")]
    NotASelect(String),

    #[error("binding error: {0}")]
    Binding(#[from] BindingError),
}

impl ReportError {
    pub fn is_division_by_zero(&self) -> bool {
        matches!(self, ReportError::DivisionByZero { .. })
    }
}
