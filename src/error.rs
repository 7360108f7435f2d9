//! Error types for the pipeline runner

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Every failure that stops a pipeline run.
///
/// Data-quality anomalies are deliberately absent: a check returning rows is
/// reported, not raised.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read SQL file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Query failed ({reason}): {message}")]
    Query { message: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response from warehouse: {0}")]
    Response(String),

    #[error("Could not split SQL into statements: {0}")]
    Split(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn query(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            reason: reason.into(),
        }
    }
}
