use thiserror::Error;

use crate::domain::models::BulkOutcome;

/// Errors that can occur during log storage operations
#[derive(Debug, Error)]
pub enum LogStorageError {
    #[error("log storage backend is not configured (missing {0})")]
    Unconfigured(&'static str),

    #[error("search index request failed: {0}")]
    RequestFailed(String),

    #[error("unexpected search index response: {0}")]
    BadResponse(String),

    #[error("bulk save rejected: {0}")]
    BulkRejected(BulkOutcome),
}

impl From<reqwest::Error> for LogStorageError {
    fn from(err: reqwest::Error) -> Self {
        LogStorageError::RequestFailed(err.to_string())
    }
}

/// Result type for log storage operations
pub type LogResult<T> = Result<T, LogStorageError>;
