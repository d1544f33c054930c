//! Error types for the exporters.

use thiserror::Error;

/// Errors that can occur while writing change files.
#[derive(Error, Debug)]
pub enum ExportError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
