//! Core error types for `FinData`.

use thiserror::Error;

/// Core error type for `FinData` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A session was built from a token without a user, or the reverse.
    #[error("Inconsistent session: {0}")]
    InconsistentSession(String),

    /// Invalid data from an API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unknown scraping method name.
    #[error("Unknown scraping method: {0}")]
    UnknownMethod(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
