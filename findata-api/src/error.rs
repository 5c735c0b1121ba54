//! Service errors.
//!
//! [`ApiError`] is the classified failure of a facade operation. Every
//! variant displays a message that is safe to show to the end user. Raw
//! transport, decode and storage details are only kept for logging.

use findata_core::{ErrorMessage, FailureKind, MessageCatalog, Outcome};
use findata_fetch::FetchError;
use findata_store::StoreError;
use thiserror::Error;
use tracing::warn;

// ============================================================================
// Validation Error
// ============================================================================

/// Input rejected before any request was made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{field} is required")]
    Missing {
        /// Field name.
        field: &'static str,
    },

    /// The URL does not match the configured pattern.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The URL is longer than allowed.
    #[error("URL is too long ({length} characters, maximum {max})")]
    UrlTooLong {
        /// Actual length.
        length: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A field is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Field name.
        field: &'static str,
        /// Configured minimum.
        min: usize,
    },

    /// The email address is malformed.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

// ============================================================================
// API Error
// ============================================================================

/// Classified failure of a facade operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected client-side, never sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server rejected the credential. The session is already gone.
    #[error("{message}")]
    Auth {
        /// User-facing message.
        message: String,
    },

    /// Any other 4xx, or a 2xx body with `success: false`.
    #[error("{message}")]
    ClientRequest {
        /// Status code.
        status: u16,
        /// User-facing message.
        message: String,
    },

    /// 5xx after all retries.
    #[error("{message}")]
    Server {
        /// Status code.
        status: u16,
        /// User-facing message.
        message: String,
    },

    /// No response after all retries.
    #[error("{message}")]
    Transport {
        /// User-facing message.
        message: String,
        /// Diagnostic cause, for logs only.
        cause: String,
    },

    /// A 2xx body did not have the expected shape.
    #[error("{message}")]
    Decode {
        /// User-facing message.
        message: String,
        /// Diagnostic cause, for logs only.
        cause: String,
    },

    /// The request could not be built.
    #[error("{message}")]
    Fetch {
        /// User-facing message.
        message: String,
        /// Underlying error, for logs only.
        #[source]
        source: FetchError,
    },

    /// The local session or history could not be written.
    #[error("{message}")]
    Store {
        /// User-facing message.
        message: String,
        /// Underlying error, for logs only.
        #[source]
        source: StoreError,
    },
}

impl From<FetchError> for ApiError {
    fn from(source: FetchError) -> Self {
        Self::fetch(source, &MessageCatalog::new())
    }
}

impl From<StoreError> for ApiError {
    fn from(source: StoreError) -> Self {
        Self::store(source, &MessageCatalog::new())
    }
}

impl ApiError {
    /// A body that does not match the expected shape. Only the catalog text
    /// is shown, `cause` is logged.
    pub fn decode(cause: impl Into<String>, messages: &MessageCatalog) -> Self {
        let cause = cause.into();
        warn!(%cause, "Unexpected response body");
        Self::Decode {
            message: messages.error(ErrorMessage::UnknownError).to_string(),
            cause,
        }
    }

    /// A request that could not be built or sent.
    pub fn fetch(source: FetchError, messages: &MessageCatalog) -> Self {
        warn!(error = %source, "Request failed before classification");
        Self::Fetch {
            message: messages.error(ErrorMessage::UnknownError).to_string(),
            source,
        }
    }

    /// A local storage failure.
    pub fn store(source: StoreError, messages: &MessageCatalog) -> Self {
        warn!(error = %source, "Local storage failed");
        Self::Store {
            message: messages.error(ErrorMessage::UnknownError).to_string(),
            source,
        }
    }

    /// Classifies a failed outcome. Returns `None` for a success.
    ///
    /// The server's own message is preferred over the catalog text.
    pub fn from_outcome(outcome: Outcome, messages: &MessageCatalog) -> Option<Self> {
        match outcome {
            Outcome::Success { .. } => None,
            Outcome::NetworkFailure { cause } => Some(Self::Transport {
                message: messages.error(ErrorMessage::NetworkError).to_string(),
                cause,
            }),
            Outcome::HttpFailure {
                status,
                message,
                detail,
            } => {
                let message = detail.unwrap_or(message);
                Some(match FailureKind::from_status(status) {
                    FailureKind::Auth => Self::Auth { message },
                    FailureKind::Server => Self::Server { status, message },
                    _ => Self::ClientRequest { status, message },
                })
            }
        }
    }

    /// Returns the failure category, if this is a classified failure.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Validation(_) => Some(FailureKind::Validation),
            Self::Auth { .. } => Some(FailureKind::Auth),
            Self::ClientRequest { .. } => Some(FailureKind::ClientRequest),
            Self::Server { .. } => Some(FailureKind::Server),
            Self::Transport { .. } => Some(FailureKind::Transport),
            Self::Decode { .. } | Self::Fetch { .. } | Self::Store { .. } => None,
        }
    }

    /// Returns the HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { .. } => Some(401),
            Self::ClientRequest { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the session was torn down by this failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Returns true if this failure never reached the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if no response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
