//! Error taxonomy for table loading and reconciliation.
//!
//! Structural problems (unreadable file, missing column, undefined math) are
//! reported through [`ReconcileError`]. Per-record anomalies such as a
//! non-numeric year or an unmatched key never become errors; the operations
//! exclude them from their results instead.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The input file could not be opened or read.
    #[error("Unable to read input {path:?}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// An expected column is absent, or the delimited text is malformed.
    #[error("{0}")]
    Parse(String),
    /// A value lies outside the domain of the requested transform.
    #[error("Value {value} for '{key}' is outside the domain of log10")]
    Domain { key: String, value: f64 },
}

impl ReconcileError {
    pub fn missing_column(column: &str, context: &str) -> Self {
        ReconcileError::Parse(format!("Column '{column}' not found in {context}"))
    }

    pub fn is_input(&self) -> bool {
        matches!(self, ReconcileError::Input { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ReconcileError::Parse(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, ReconcileError::Domain { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
