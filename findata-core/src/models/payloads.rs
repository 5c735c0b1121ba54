//! Request and response payloads of the REST API.
//!
//! Response types keep any field they do not model in an `extra` map so
//! that the CLI can still print the full document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::session::UserProfile;
use crate::error::CoreError;

// ============================================================================
// Common
// ============================================================================

/// Minimal `{success, message?}` envelope returned by most endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    /// Whether the server considers the operation successful.
    #[serde(default)]
    pub success: bool,
    /// Optional server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Auth
// ============================================================================

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain password.
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Server success flag.
    #[serde(default)]
    pub success: bool,
    /// Server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Bearer token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Logged-in user.
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Login name.
    pub username: String,
    /// Plain password.
    pub password: String,
    /// Email address.
    pub email: String,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Response of `GET /dashboard/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Server success flag.
    #[serde(default)]
    pub success: bool,
    /// Per-user counters.
    #[serde(default)]
    pub user_stats: Value,
    /// Subscription details.
    #[serde(default)]
    pub subscription: Value,
    /// API configuration exposed to the user.
    #[serde(default)]
    pub api_config: Value,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatsResponse {
    /// Total number of scraping runs, if reported.
    pub fn total_scraping(&self) -> Option<u64> {
        self.user_stats.get("total_scraping").and_then(Value::as_u64)
    }

    /// Total number of extracted articles, if reported.
    pub fn total_articles(&self) -> Option<u64> {
        self.user_stats.get("total_articles").and_then(Value::as_u64)
    }
}

/// Response of `GET /dashboard/analytics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    /// Server success flag.
    #[serde(default)]
    pub success: bool,
    /// Per-domain aggregates.
    #[serde(default)]
    pub domain_stats: Vec<Value>,
    /// Past scraping runs.
    #[serde(default)]
    pub scraping_history: Vec<Value>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalyticsResponse {
    /// Number of history entries whose status is `success`.
    pub fn successful_runs(&self) -> usize {
        self.scraping_history
            .iter()
            .filter(|entry| entry.get("status").and_then(Value::as_str) == Some("success"))
            .count()
    }
}

// ============================================================================
// Scraping
// ============================================================================

/// Backend fetch strategy for an extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMethod {
    /// Scrape.do proxy (recommended).
    #[default]
    Scrapedo,
    /// Plain HTTP requests.
    Requests,
}

impl ScrapeMethod {
    /// Returns the wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scrapedo => "scrapedo",
            Self::Requests => "requests",
        }
    }
}

impl fmt::Display for ScrapeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrapeMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scrapedo" => Ok(Self::Scrapedo),
            "requests" => Ok(Self::Requests),
            other => Err(CoreError::UnknownMethod(other.to_string())),
        }
    }
}

/// Body of `POST /scraping/extract`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractRequest {
    /// Target site.
    pub url: String,
    /// Fetch strategy.
    pub method: ScrapeMethod,
    /// Maximum number of articles to extract.
    pub max_articles: u32,
    /// Maximum number of AI summaries to generate.
    pub max_ia_summaries: u32,
}

impl ExtractRequest {
    /// Creates a request with the default limits (20 articles, 10 summaries).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: ScrapeMethod::default(),
            max_articles: 20,
            max_ia_summaries: 10,
        }
    }

    /// Sets the fetch strategy.
    pub fn with_method(mut self, method: ScrapeMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the article limit.
    pub fn with_max_articles(mut self, max: u32) -> Self {
        self.max_articles = max;
        self
    }

    /// Sets the summary limit.
    pub fn with_max_summaries(mut self, max: u32) -> Self {
        self.max_ia_summaries = max;
        self
    }
}

/// A single extracted article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Link to the article.
    #[serde(default)]
    pub url: Option<String>,
    /// Publication date as sent by the server.
    #[serde(default)]
    pub date: Option<String>,
    /// Main text.
    #[serde(default)]
    pub content: Option<String>,
    /// AI summary.
    #[serde(default)]
    pub resume: Option<String>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `POST /scraping/extract`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Server success flag.
    #[serde(default)]
    pub success: bool,
    /// Server message (set on failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Extracted articles.
    #[serde(default)]
    pub articles: Vec<Article>,
    /// Article count reported by the server.
    #[serde(default)]
    pub total_articles: u64,
    /// Strategy the server actually used.
    #[serde(default)]
    pub method_used: Option<String>,
    /// Processing time, as formatted by the server.
    #[serde(default)]
    pub processing_time: Option<Value>,
    /// How many articles carry an AI summary.
    #[serde(default)]
    pub articles_with_summaries: u64,
    /// Scraped domain.
    #[serde(default)]
    pub domain: Option<String>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Health
// ============================================================================

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, `degraded`, or `unhealthy`.
    pub status: String,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HealthResponse {
    /// Returns true if the backend reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
