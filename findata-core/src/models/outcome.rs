//! Request outcome types.
//!
//! - [`Outcome`] - The tagged result of one dispatch or one logical call
//! - [`FailureKind`] - Error taxonomy

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Failure Kind
// ============================================================================

/// Classified failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected client-side before any request was made.
    Validation,
    /// The server answered 401.
    Auth,
    /// Any other 4xx.
    ClientRequest,
    /// 5xx.
    Server,
    /// No response at all (connect error, DNS, timeout).
    Transport,
}

impl FailureKind {
    /// Classifies an HTTP error status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Auth,
            500..=599 => Self::Server,
            _ => Self::ClientRequest,
        }
    }

    /// Returns true if a logical call may retry after this failure.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Server | Self::Transport)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::ClientRequest => "client request",
            Self::Server => "server",
            Self::Transport => "transport",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of a dispatch. Every dispatch yields exactly one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx response.
    Success {
        /// HTTP status code.
        status: u16,
        /// Parsed JSON body (`Null` when empty or not JSON).
        body: Value,
    },
    /// No response was received.
    NetworkFailure {
        /// Diagnostic cause, for logs only.
        cause: String,
    },
    /// Non-2xx response.
    HttpFailure {
        /// HTTP status code.
        status: u16,
        /// Catalog message for the status.
        message: String,
        /// `message` field of the error body, when the server sent one.
        detail: Option<String>,
    },
}

impl Outcome {
    /// Returns true for a 2xx outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } | Self::HttpFailure { status, .. } => Some(*status),
            Self::NetworkFailure { .. } => None,
        }
    }

    /// Returns the failure category, or `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::NetworkFailure { .. } => Some(FailureKind::Transport),
            Self::HttpFailure { status, .. } => Some(FailureKind::from_status(*status)),
        }
    }

    /// Returns true if another attempt may be made after this outcome.
    pub fn is_retryable(&self) -> bool {
        self.failure_kind().is_some_and(FailureKind::is_retryable)
    }

    /// Returns true for a 401.
    pub fn is_auth_failure(&self) -> bool {
        self.failure_kind() == Some(FailureKind::Auth)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> Outcome {
        Outcome::HttpFailure {
            status,
            message: String::new(),
            detail: None,
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(http(401).failure_kind(), Some(FailureKind::Auth));
        assert_eq!(http(404).failure_kind(), Some(FailureKind::ClientRequest));
        assert_eq!(http(429).failure_kind(), Some(FailureKind::ClientRequest));
        assert_eq!(http(503).failure_kind(), Some(FailureKind::Server));

        let network = Outcome::NetworkFailure {
            cause: "connection refused".to_string(),
        };
        assert_eq!(network.failure_kind(), Some(FailureKind::Transport));
        assert_eq!(network.status(), None);
    }

    #[test]
    fn test_retryable() {
        assert!(http(500).is_retryable());
        assert!(http(502).is_retryable());
        assert!(!http(400).is_retryable());
        assert!(!http(401).is_retryable());
        assert!(Outcome::NetworkFailure { cause: "timeout".into() }.is_retryable());

        let ok = Outcome::Success {
            status: 200,
            body: Value::Null,
        };
        assert!(ok.is_success());
        assert!(!ok.is_retryable());
        assert_eq!(ok.failure_kind(), None);
    }
}
