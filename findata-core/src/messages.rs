//! Human-readable message catalog.
//!
//! Every terminal failure shown to a user is resolved through this catalog,
//! keyed by category. Raw transport and protocol details never end up here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Message Keys
// ============================================================================

/// Error message categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMessage {
    /// No response from the server.
    NetworkError,
    /// 400.
    BadRequest,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 429.
    TooManyRequests,
    /// 500.
    ServerError,
    /// Anything without a dedicated entry.
    UnknownError,
}

impl ErrorMessage {
    /// Maps an HTTP status code to its catalog entry.
    pub fn for_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::TooManyRequests,
            500 => Self::ServerError,
            _ => Self::UnknownError,
        }
    }

    /// Returns the built-in text for this entry.
    pub fn default_text(self) -> &'static str {
        match self {
            Self::NetworkError => "Unable to reach the server",
            Self::BadRequest => "Invalid request",
            Self::Unauthorized => "Session expired, please log in again",
            Self::Forbidden => "Access denied",
            Self::NotFound => "Resource not found",
            Self::TooManyRequests => "Too many requests, please slow down",
            Self::ServerError => "Internal server error",
            Self::UnknownError => "An unexpected error occurred",
        }
    }

    /// Returns all error keys.
    pub fn all() -> &'static [ErrorMessage] {
        &[
            Self::NetworkError,
            Self::BadRequest,
            Self::Unauthorized,
            Self::Forbidden,
            Self::NotFound,
            Self::TooManyRequests,
            Self::ServerError,
            Self::UnknownError,
        ]
    }
}

/// Success message categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessMessage {
    /// Login completed.
    Login,
    /// Logout completed.
    Logout,
    /// Account created.
    Register,
    /// Extraction submitted.
    ScrapingStarted,
    /// Extraction finished.
    ScrapingCompleted,
    /// Dashboard data fetched.
    DataLoaded,
}

impl SuccessMessage {
    /// Returns the built-in text for this entry.
    pub fn default_text(self) -> &'static str {
        match self {
            Self::Login => "Logged in successfully",
            Self::Logout => "Logged out successfully",
            Self::Register => "Account created, you can now log in",
            Self::ScrapingStarted => "Scraping started",
            Self::ScrapingCompleted => "Scraping completed successfully",
            Self::DataLoaded => "Data loaded successfully",
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Fixed catalog of user-facing messages.
///
/// Entries can be overridden (for example from a config file); missing
/// entries fall back to the built-in text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    errors: HashMap<ErrorMessage, String>,
    success: HashMap<SuccessMessage, String>,
}

impl MessageCatalog {
    /// Creates a catalog holding only the built-in texts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text for an error category.
    pub fn error(&self, key: ErrorMessage) -> &str {
        self.errors
            .get(&key)
            .map_or_else(|| key.default_text(), String::as_str)
    }

    /// Returns the text for a success category.
    pub fn success(&self, key: SuccessMessage) -> &str {
        self.success
            .get(&key)
            .map_or_else(|| key.default_text(), String::as_str)
    }

    /// Resolves the message for an HTTP status code.
    pub fn for_status(&self, status: u16) -> &str {
        self.error(ErrorMessage::for_status(status))
    }

    /// Overrides an error text.
    pub fn with_error(mut self, key: ErrorMessage, text: impl Into<String>) -> Self {
        self.errors.insert(key, text.into());
        self
    }

    /// Overrides a success text.
    pub fn with_success(mut self, key: SuccessMessage, text: impl Into<String>) -> Self {
        self.success.insert(key, text.into());
        self
    }

    /// Applies every override from `other` on top of this catalog.
    pub fn merge(&mut self, other: MessageCatalog) {
        self.errors.extend(other.errors);
        self.success.extend(other.success);
    }
}

// ============================================================================
// Tests
// ============================================================================
