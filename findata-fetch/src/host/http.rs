//! HTTP transport.
//!
//! [`Transport`] sends one fully prepared request and returns whatever the
//! server answered, without classifying it. [`ReqwestTransport`] is the
//! production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{FetchError, TransportError};

/// User agent string for the client.
const USER_AGENT: &str = concat!("findata/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Wire Types
// ============================================================================

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// All headers, including `Authorization` when a token is held.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: Option<Value>,
    /// Timeout for this attempt.
    pub timeout: Duration,
}

impl HttpRequest {
    /// Returns the bearer token carried by this request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Whatever the server answered.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Parsed JSON body. Empty bodies are `Null`, non-JSON bodies a string.
    pub body: Value,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Parses a raw body.
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Sends prepared requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`. Any status code is a response; only the absence of
    /// a response is an error.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ============================================================================
// Reqwest Transport
// ============================================================================

/// Transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default client settings.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { inner: client }
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        let mut builder = self
            .inner
            .request(request.method, request.url)
            .headers(request.headers)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(timeout);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout))?;
        let status = response.status().as_u16();
        debug!(status, "Response received");

        let text = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout))?;
        Ok(HttpResponse::from_text(status, &text))
    }
}

// ============================================================================
// Tests
// ============================================================================
