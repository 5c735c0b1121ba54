//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage medium holds data that cannot be interpreted.
    #[error("Corrupt storage: {0}")]
    Corrupt(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }
}

/// Malformed configuration. Aborts start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API base URL cannot be parsed.
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// An environment or file value has the wrong type.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// A validation pattern does not compile.
    #[error("Invalid pattern {pattern}: {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Regex compiler error.
        #[source]
        source: regex::Error,
    },

    /// The config file cannot be read.
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON.
    #[error("Cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
