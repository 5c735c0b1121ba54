//! Application configuration.
//!
//! Resolved once at start-up from three layers, later layers winning:
//! built-in defaults, an optional JSON file, and `FINDATA_*` environment
//! variables. The result is immutable and shared as `Arc<AppConfig>`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use findata_core::MessageCatalog;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;
use crate::persistence::default_config_path;

// ============================================================================
// Defaults
// ============================================================================

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for extraction requests.
pub const DEFAULT_SCRAPING_TIMEOUT: Duration = Duration::from_secs(180);

/// Default number of additional attempts after a retryable failure.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay of the linear backoff.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Accepted URL shape: scheme plus a non-empty remainder.
pub const DEFAULT_URL_PATTERN: &str = r"^https?://.+";

/// Accepted email shape.
pub const DEFAULT_EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Environment variable names.
pub mod env {
    /// API base URL.
    pub const API_URL: &str = "FINDATA_API_URL";
    /// Default request timeout in milliseconds.
    pub const REQUEST_TIMEOUT_MS: &str = "FINDATA_REQUEST_TIMEOUT_MS";
    /// Extraction timeout in milliseconds.
    pub const SCRAPING_TIMEOUT_MS: &str = "FINDATA_SCRAPING_TIMEOUT_MS";
    /// Maximum number of retries.
    pub const MAX_RETRIES: &str = "FINDATA_MAX_RETRIES";
    /// Base retry delay in milliseconds.
    pub const RETRY_DELAY_MS: &str = "FINDATA_RETRY_DELAY_MS";
    /// Persisted session file.
    pub const SESSION_FILE: &str = "FINDATA_SESSION_FILE";
}

// ============================================================================
// Storage Keys
// ============================================================================

/// Keys of the persisted session in the storage medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Key holding the bearer token.
    pub token: String,
    /// Key holding the serialized user profile.
    pub user: String,
}

impl StorageKeys {
    /// Returns true if `key` belongs to the session.
    pub fn contains(&self, key: &str) -> bool {
        key == self.token || key == self.user
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "token".to_string(),
            user: "user".to_string(),
        }
    }
}

// ============================================================================
// Validation Rules
// ============================================================================

/// Pre-flight validation rules.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    url_pattern: Regex,
    email_pattern: Regex,
    /// Longest URL accepted.
    pub max_url_length: usize,
    /// Shortest password accepted at registration.
    pub min_password_length: usize,
    /// Shortest username accepted at registration.
    pub min_username_length: usize,
}

impl ValidationRules {
    /// Compiles the given patterns with the default length limits.
    pub fn new(url_pattern: &str, email_pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url_pattern: compile(url_pattern)?,
            email_pattern: compile(email_pattern)?,
            max_url_length: 2048,
            min_password_length: 6,
            min_username_length: 3,
        })
    }

    /// Returns true if `url` has the accepted shape.
    pub fn url_matches(&self, url: &str) -> bool {
        self.url_pattern.is_match(url)
    }

    /// Returns true if `email` has the accepted shape.
    pub fn email_matches(&self, email: &str) -> bool {
        self.email_pattern.is_match(email)
    }
}

impl Default for ValidationRules {
    /// Creates the built-in rules.
    ///
    /// # Panics
    ///
    /// Panics if the built-in patterns fail to compile, which would be a
    /// programming error caught by the tests below.
    fn default() -> Self {
        Self::new(DEFAULT_URL_PATTERN, DEFAULT_EMAIL_PATTERN)
            .unwrap_or_else(|e| panic!("Built-in validation patterns are invalid: {e}"))
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// ============================================================================
// Config File
// ============================================================================

/// Optional overrides read from `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// API base URL.
    pub api_base_url: Option<String>,
    /// Default request timeout in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// Extraction timeout in milliseconds.
    pub scraping_timeout_ms: Option<u64>,
    /// Maximum number of retries.
    pub max_retries: Option<u32>,
    /// Base retry delay in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// URL validation pattern.
    pub url_pattern: Option<String>,
    /// Persisted session file.
    pub session_file: Option<PathBuf>,
    /// Message overrides.
    pub messages: Option<MessageCatalog>,
}

impl ConfigFile {
    /// Reads a config file. A missing file yields empty overrides.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let file = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration file");
        Ok(file)
    }
}

// ============================================================================
// App Config
// ============================================================================

/// Read-only application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL every request path is appended to.
    pub api_base_url: Url,
    /// Default per-request timeout.
    pub request_timeout: Duration,
    /// Timeout override for extraction requests.
    pub scraping_timeout: Duration,
    /// Additional attempts after a retryable failure.
    pub max_retries: u32,
    /// Base delay of the linear backoff.
    pub retry_delay: Duration,
    /// Pre-flight validation rules.
    pub validation: ValidationRules,
    /// User-facing messages.
    pub messages: MessageCatalog,
    /// Session keys in the storage medium.
    pub storage_keys: StorageKeys,
    /// Route to navigate to when the session is torn down.
    pub landing_route: String,
    /// Persisted session file, when not the default location.
    pub session_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            scraping_timeout: DEFAULT_SCRAPING_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            validation: ValidationRules::default(),
            messages: MessageCatalog::default(),
            storage_keys: StorageKeys::default(),
            landing_route: "/".to_string(),
            session_file: None,
        }
    }
}

/// Parses [`DEFAULT_API_BASE_URL`].
///
/// # Panics
///
/// Panics if the built-in URL does not parse, which would be a programming
/// error caught by the tests below.
fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL)
        .unwrap_or_else(|e| panic!("Built-in base URL is invalid: {e}"))
}

impl AppConfig {
    /// Loads the configuration from the default file and the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Loads the configuration from a specific file and the process
    /// environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = ConfigFile::read(path)?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Resolves defaults, file overrides, and environment overrides.
    ///
    /// `lookup` returns the value of an environment variable.
    pub fn resolve<F>(file: ConfigFile, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // File layer
        if let Some(url) = file.api_base_url {
            config.api_base_url = parse_base_url(&url)?;
        }
        if let Some(ms) = file.request_timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.scraping_timeout_ms {
            config.scraping_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = file.max_retries {
            config.max_retries = n;
        }
        if let Some(ms) = file.retry_delay_ms {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(pattern) = file.url_pattern {
            config.validation.url_pattern = compile(&pattern)?;
        }
        if let Some(path) = file.session_file {
            config.session_file = Some(path);
        }
        if let Some(messages) = file.messages {
            config.messages.merge(messages);
        }

        // Environment layer
        if let Some(url) = lookup(env::API_URL).filter(|v| !v.is_empty()) {
            config.api_base_url = parse_base_url(&url)?;
        }
        if let Some(ms) = parse_env::<u64>(&lookup, env::REQUEST_TIMEOUT_MS)? {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env::<u64>(&lookup, env::SCRAPING_TIMEOUT_MS)? {
            config.scraping_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse_env::<u32>(&lookup, env::MAX_RETRIES)? {
            config.max_retries = n;
        }
        if let Some(ms) = parse_env::<u64>(&lookup, env::RETRY_DELAY_MS)? {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(path) = lookup(env::SESSION_FILE).filter(|v| !v.is_empty()) {
            config.session_file = Some(PathBuf::from(path));
        }

        debug!(
            base_url = %config.api_base_url,
            timeout = ?config.request_timeout,
            max_retries = config.max_retries,
            "Configuration resolved"
        );
        Ok(config)
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = parse_base_url(url)?;
        Ok(self)
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, max_retries: u32, delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = delay;
        self
    }

    /// Sets both timeouts.
    pub fn with_timeouts(mut self, request: Duration, scraping: Duration) -> Self {
        self.request_timeout = request;
        self.scraping_timeout = scraping;
        self
    }
}

fn parse_base_url(url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(parsed)
}

fn parse_env<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.api_base_url.as_str(), "http://localhost:8080/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.scraping_timeout, Duration::from_secs(180));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.storage_keys.token, "token");
        assert_eq!(config.landing_route, "/");
    }

    #[test]
    fn test_builtin_patterns() {
        let rules = ValidationRules::default();

        assert!(rules.url_matches("https://example.com"));
        assert!(rules.url_matches("http://x"));
        assert!(!rules.url_matches("https://"));
        assert!(!rules.url_matches("ftp://example.com"));

        assert!(rules.email_matches("a@b.co"));
        assert!(!rules.email_matches("a@b"));
        assert!(!rules.email_matches("a b@c.d"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            api_base_url: Some("https://file.example.com/api".to_string()),
            max_retries: Some(5),
            ..Default::default()
        };
        let lookup = lookup_from(&[
            (env::API_URL, "https://env.example.com/api"),
            (env::RETRY_DELAY_MS, "250"),
        ]);

        let config = AppConfig::resolve(file, lookup).unwrap();

        assert_eq!(config.api_base_url.host_str(), Some("env.example.com"));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_malformed_values_are_errors() {
        let bad_number = AppConfig::resolve(
            ConfigFile::default(),
            lookup_from(&[(env::MAX_RETRIES, "three")]),
        );
        assert!(matches!(bad_number, Err(ConfigError::InvalidValue { .. })));

        let bad_url = AppConfig::resolve(
            ConfigFile::default(),
            lookup_from(&[(env::API_URL, "not a url")]),
        );
        assert!(matches!(bad_url, Err(ConfigError::InvalidBaseUrl { .. })));

        let bad_pattern = AppConfig::resolve(
            ConfigFile {
                url_pattern: Some("(".to_string()),
                ..Default::default()
            },
            lookup_from(&[]),
        );
        assert!(matches!(bad_pattern, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_read_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"request_timeout_ms": 5000, "messages": {"errors": {"not_found": "Introuvable"}}}"#,
        )
        .unwrap();

        let file = ConfigFile::read(&path).unwrap();
        let config = AppConfig::resolve(file, lookup_from(&[])).unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.messages.for_status(404), "Introuvable");

        let missing = ConfigFile::read(&temp_dir.path().join("absent.json")).unwrap();
        assert!(missing.api_base_url.is_none());
    }
}
