//! Error types for the results log.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV.
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A column every stored evaluation needs is absent from the header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// A cell could not be read back into an evaluation.
    #[error("invalid {column} value '{value}' on line {line} of {path}: {message}")]
    InvalidRow {
        path: PathBuf,
        line: usize,
        column: String,
        value: String,
        message: String,
    },

    /// Temporary file could not replace the target.
    #[error("failed to replace {target_path}: {source}")]
    AtomicWriteFailed {
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
