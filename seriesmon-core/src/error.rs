//! Error types for sources and the admin surface.

use thiserror::Error;

/// Errors a metric source can report for one sampling attempt.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the underlying data failed.
    #[error("Read failed: {0}")]
    Read(String),

    /// The data was read but could not be understood.
    #[error("Failed to parse sample: {0}")]
    Parse(String),

    /// The source is temporarily unable to produce values.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Read(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

/// Errors returned by service configuration requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// No monitoring service is registered under this name.
    #[error("Service with name {0} could not be found.")]
    UnknownService(String),
}
