//! Error types for the micoreca library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for micoreca operations.
#[derive(Debug, Error)]
pub enum MicorecaError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single metadata unit could not be turned into a record.
    #[error("Parse error for entry {index}: {message}")]
    Parse { index: usize, message: String },

    /// Missing or invalid keyword configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing an export failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl MicorecaError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MicorecaError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for micoreca operations.
pub type Result<T> = std::result::Result<T, MicorecaError>;
