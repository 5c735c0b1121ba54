//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Transport Error
// ============================================================================

/// A request that produced no HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server could not be reached (DNS, refused, reset).
    #[error("Connection failed: {0}")]
    Connect(String),

    /// No response within the request timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Any other failure before a response arrived.
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Classifies a reqwest error.
    pub fn from_reqwest(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else {
            Self::Other(error.to_string())
        }
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

// ============================================================================
// Fetch Error
// ============================================================================

/// Conditions that abort a call instead of resolving to an outcome.
///
/// Expected HTTP-level failures are never reported here.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request URL cannot be built from the base URL and path.
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl {
        /// The URL that was attempted.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The request body cannot be serialized.
    #[error("Cannot encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP client cannot be constructed.
    #[error("Cannot build HTTP client: {0}")]
    Client(String),
}

// ============================================================================
// Tests
// ============================================================================
