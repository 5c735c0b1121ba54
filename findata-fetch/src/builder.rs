//! Builder for the request pipeline.

use std::sync::Arc;
use std::time::Duration;

use findata_core::MessageCatalog;
use findata_store::{AppConfig, AuthNotifier, SessionStore};
use url::Url;

use crate::error::FetchError;
use crate::host::{LoggingNavigator, Navigator, ReqwestTransport, Transport};
use crate::pipeline::RequestPipeline;
use crate::retry::RetryStrategy;

/// Builder for constructing a [`RequestPipeline`].
///
/// Settings default to [`AppConfig::default`]; host APIs default to the
/// reqwest transport and a logging navigator.
pub struct PipelineBuilder {
    session: SessionStore,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<AuthNotifier>,
    navigator: Option<Arc<dyn Navigator>>,
    base_url: Url,
    default_timeout: Duration,
    retry: RetryStrategy,
    messages: MessageCatalog,
    landing_route: String,
}

impl PipelineBuilder {
    /// Creates a builder for a pipeline on `session`.
    pub fn new(session: SessionStore) -> Self {
        let defaults = AppConfig::default();
        Self {
            session,
            transport: None,
            notifier: None,
            navigator: None,
            base_url: defaults.api_base_url,
            default_timeout: defaults.request_timeout,
            retry: RetryStrategy::new(defaults.max_retries).with_base_delay(defaults.retry_delay),
            messages: defaults.messages,
            landing_route: defaults.landing_route,
        }
    }

    /// Applies every pipeline setting of `config`.
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.base_url = config.api_base_url.clone();
        self.default_timeout = config.request_timeout;
        self.retry = RetryStrategy::from_config(config);
        self.messages = config.messages.clone();
        self.landing_route = config.landing_route.clone();
        self
    }

    /// Sets the transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the notifier that receives local transitions.
    pub fn notifier(mut self, notifier: AuthNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the navigator.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Sets the default timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the retry strategy.
    pub fn retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// Builds the pipeline.
    pub fn build(self) -> Result<RequestPipeline, FetchError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(RequestPipeline {
            transport,
            session: self.session,
            notifier: self.notifier.unwrap_or_default(),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(LoggingNavigator)),
            base_url: self.base_url,
            default_timeout: self.default_timeout,
            retry: self.retry,
            messages: self.messages,
            landing_route: self.landing_route,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let pipeline = PipelineBuilder::new(SessionStore::in_memory())
            .build()
            .unwrap();

        assert_eq!(pipeline.base_url().as_str(), "http://localhost:8080/api");
        assert_eq!(pipeline.default_timeout(), Duration::from_secs(30));
        assert_eq!(pipeline.retry_strategy(), &RetryStrategy::new(3));
    }

    #[test]
    fn test_builder_applies_config() {
        let config = AppConfig::default()
            .with_base_url("https://findata.example.com/api")
            .unwrap()
            .with_retry(1, Duration::from_millis(10))
            .with_timeouts(Duration::from_secs(5), Duration::from_secs(60));

        let pipeline = RequestPipeline::builder(SessionStore::in_memory())
            .config(&config)
            .build()
            .unwrap();

        assert_eq!(pipeline.base_url().host_str(), Some("findata.example.com"));
        assert_eq!(pipeline.default_timeout(), Duration::from_secs(5));
        assert_eq!(pipeline.retry_strategy().max_retries, 1);
    }
}
