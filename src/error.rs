//! Error types for vocabulary training and persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum VocabError {
    /// A file could not be opened, created, or read
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Failure on an already-open stream
    #[error("Stream error: {0}")]
    Read(#[from] std::io::Error),

    /// Vocabulary file does not follow the expected layout
    #[error("Format error: {0}")]
    Format(String),

    /// JSON text could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Segmentation pattern failed to compile
    #[error("Invalid segmentation pattern: {0}")]
    Pattern(#[from] fancy_regex::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VocabError {
    /// Attach a path to an I/O error.
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, VocabError>;
