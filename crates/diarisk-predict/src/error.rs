//! Error types for artifact loading and scoring.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the fitted artifacts.
///
/// All of them are fatal: there is no fallback model.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact file missing or unreadable.
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not valid JSON for its format.
    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact parsed but its fitted parameters are inconsistent.
    #[error("invalid artifact {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    /// Artifact content differs from the pinned digest.
    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Transform output width differs from classifier input width.
    #[error("transform produces {transform} features but classifier expects {classifier}")]
    Incompatible { transform: usize, classifier: usize },
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while scoring a record.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("expected {expected} features, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("non-finite value produced by {stage}")]
    NonFinite { stage: &'static str },

    #[error("decision threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

pub type Result<T> = std::result::Result<T, PredictError>;
