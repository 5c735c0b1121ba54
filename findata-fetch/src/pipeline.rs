//! The request pipeline.
//!
//! One logical call goes through these steps:
//!
//! 1. The descriptor is resolved against the base URL and the bearer token
//!    is read from the session store, once for the whole call.
//! 2. Each attempt is sent through the [`Transport`] under the request
//!    timeout and classified into an [`Outcome`].
//! 3. The first 401 of the call clears the session, emits a local auth
//!    transition and navigates to the landing route.
//! 4. Server and network failures are retried per the [`RetryStrategy`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use findata_core::{MessageCatalog, Outcome};
use findata_store::{AuthNotifier, SessionStore};
use reqwest::header::{self, HeaderValue};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{FetchError, TransportError};
use crate::host::{HttpRequest, HttpResponse, Navigator, Transport};
use crate::request::RequestDescriptor;
use crate::retry::{RetryStrategy, with_retry};

// ============================================================================
// Call Report
// ============================================================================

/// Summary of one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallReport {
    /// Attempts made, at least one.
    pub attempts: u32,
    /// Time from the first attempt's start to the final outcome.
    pub elapsed: Duration,
    /// Status of the final response, if any.
    pub status: Option<u16>,
    /// Whether this call tore the session down.
    pub session_cleared: bool,
}

/// Final outcome of a logical call together with its report.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    /// Outcome of the last attempt.
    pub outcome: Outcome,
    /// How the call went.
    pub report: CallReport,
}

// ============================================================================
// Logical Call
// ============================================================================

/// Per-call state shared by all attempts.
struct LogicalCall {
    request: HttpRequest,
    /// Single-shot guard for the 401 teardown.
    auth_handled: AtomicBool,
}

// ============================================================================
// Request Pipeline
// ============================================================================

/// Sends requests with the session's credential and classifies the answers.
pub struct RequestPipeline {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) session: SessionStore,
    pub(crate) notifier: AuthNotifier,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) base_url: Url,
    pub(crate) default_timeout: Duration,
    pub(crate) retry: RetryStrategy,
    pub(crate) messages: MessageCatalog,
    pub(crate) landing_route: String,
}

impl RequestPipeline {
    /// Creates a builder for a pipeline on `session`.
    pub fn builder(session: SessionStore) -> crate::builder::PipelineBuilder {
        crate::builder::PipelineBuilder::new(session)
    }

    /// Returns the session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Returns the auth notifier.
    pub fn notifier(&self) -> &AuthNotifier {
        &self.notifier
    }

    /// Returns the message catalog.
    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the timeout used when a descriptor has none.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Returns the retry strategy of [`execute`](Self::execute).
    pub fn retry_strategy(&self) -> &RetryStrategy {
        &self.retry
    }

    /// Runs one logical call with a single attempt.
    pub async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<Outcome, FetchError> {
        Ok(self
            .call(descriptor, &RetryStrategy::no_retry())
            .await?
            .outcome)
    }

    /// Runs one logical call with the configured retry strategy.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Outcome, FetchError> {
        Ok(self.call(descriptor, &self.retry).await?.outcome)
    }

    /// Runs one logical call with `strategy` and reports how it went.
    ///
    /// Only a descriptor that cannot be turned into a request is an error;
    /// every HTTP-level failure is an [`Outcome`].
    #[instrument(
        skip(self, descriptor, strategy),
        fields(method = %descriptor.method, path = %descriptor.path)
    )]
    pub async fn call(
        &self,
        descriptor: &RequestDescriptor,
        strategy: &RetryStrategy,
    ) -> Result<CallResult, FetchError> {
        let call = LogicalCall {
            request: self.prepare(descriptor)?,
            auth_handled: AtomicBool::new(false),
        };
        let start = Instant::now();

        let retried = with_retry(strategy, |attempt| self.attempt(&call, attempt)).await;

        let report = CallReport {
            attempts: retried.attempts,
            elapsed: start.elapsed(),
            status: retried.value.status(),
            session_cleared: call.auth_handled.load(Ordering::SeqCst),
        };
        debug!(
            attempts = report.attempts,
            elapsed = ?report.elapsed,
            status = ?report.status,
            success = retried.value.is_success(),
            "Call finished"
        );

        Ok(CallResult {
            outcome: retried.value,
            report,
        })
    }

    /// Builds the wire request. The token is read here, once per call.
    fn prepare(&self, descriptor: &RequestDescriptor) -> Result<HttpRequest, FetchError> {
        let url = descriptor.url(&self.base_url)?;

        let mut headers = descriptor.headers.clone();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.remove(header::AUTHORIZATION);

        if let Some(token) = self.session.token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending without it"),
            }
        }

        Ok(HttpRequest {
            method: descriptor.method.clone(),
            url,
            headers,
            body: descriptor.body.clone(),
            timeout: descriptor.timeout.unwrap_or(self.default_timeout),
        })
    }

    async fn attempt(&self, call: &LogicalCall, attempt: u32) -> Outcome {
        let timeout = call.request.timeout;
        let start = Instant::now();

        let sent = tokio::time::timeout(timeout, self.transport.send(call.request.clone())).await;
        let outcome = match sent {
            Ok(Ok(response)) => self.classify(response),
            Ok(Err(e)) => Outcome::NetworkFailure {
                cause: e.to_string(),
            },
            Err(_) => Outcome::NetworkFailure {
                cause: TransportError::Timeout(timeout).to_string(),
            },
        };

        match &outcome {
            Outcome::Success { status, .. } => {
                debug!(attempt, status, duration = ?start.elapsed(), "Attempt succeeded");
            }
            Outcome::NetworkFailure { cause } => {
                warn!(attempt, cause = %cause, duration = ?start.elapsed(), "No response");
            }
            Outcome::HttpFailure { status, detail, .. } => {
                warn!(attempt, status, detail = ?detail, "Request failed");
            }
        }

        if outcome.is_auth_failure() && !call.auth_handled.swap(true, Ordering::SeqCst) {
            self.tear_down_session();
        }

        outcome
    }

    fn classify(&self, response: HttpResponse) -> Outcome {
        let HttpResponse { status, body } = response;
        if (200..300).contains(&status) {
            return Outcome::Success { status, body };
        }

        Outcome::HttpFailure {
            status,
            message: self.messages.for_status(status).to_string(),
            detail: server_message(&body),
        }
    }

    fn tear_down_session(&self) {
        warn!(route = %self.landing_route, "Credential rejected, ending session");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.notifier.notify_local();
        self.navigator.navigate(&self.landing_route);
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("base_url", &self.base_url.as_str())
            .field("default_timeout", &self.default_timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Extracts the `message` (or `detail`) string of a JSON error body.
fn server_message(body: &Value) -> Option<String> {
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================
