//! The `FinData` client.

use std::sync::Arc;

use findata_fetch::{Navigator, RequestPipeline, Transport};
use findata_store::{AppConfig, AuthNotifier, ScrapingHistory, SessionStore};
use tracing::debug;

use crate::error::ApiError;
use crate::services::{AuthService, DashboardService, HealthService, ScrapingService};

// ============================================================================
// Client
// ============================================================================

/// Entry point to the REST API.
///
/// Cheap to clone. All clones share one pipeline, session and notifier.
#[derive(Clone)]
pub struct FinDataClient {
    config: Arc<AppConfig>,
    pipeline: Arc<RequestPipeline>,
    history: ScrapingHistory,
}

impl FinDataClient {
    /// Creates a builder using `config`.
    pub fn builder(config: AppConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Authentication lifecycle.
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    /// Read-only dashboard data.
    pub fn dashboard(&self) -> DashboardService<'_> {
        DashboardService::new(self)
    }

    /// Article extraction.
    pub fn scraping(&self) -> ScrapingService<'_> {
        ScrapingService::new(self)
    }

    /// Backend health.
    pub fn health(&self) -> HealthService<'_> {
        HealthService::new(self)
    }

    /// Returns the resolved configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the request pipeline.
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Returns the persisted session store.
    pub fn session(&self) -> &SessionStore {
        self.pipeline.session()
    }

    /// Returns the auth notifier.
    pub fn notifier(&self) -> &AuthNotifier {
        self.pipeline.notifier()
    }

    /// Returns the local scraping history.
    pub fn history(&self) -> &ScrapingHistory {
        &self.history
    }
}

impl std::fmt::Debug for FinDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinDataClient")
            .field("base_url", &self.config.api_base_url.as_str())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`FinDataClient`].
///
/// Defaults to an in-memory session, an in-memory history and the reqwest
/// transport.
pub struct ClientBuilder {
    config: AppConfig,
    session: Option<SessionStore>,
    notifier: Option<AuthNotifier>,
    transport: Option<Arc<dyn Transport>>,
    navigator: Option<Arc<dyn Navigator>>,
    history: Option<ScrapingHistory>,
    sync_contexts: bool,
}

impl ClientBuilder {
    /// Creates a builder using `config`.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: None,
            notifier: None,
            transport: None,
            navigator: None,
            history: None,
            sync_contexts: true,
        }
    }

    /// Sets the session store.
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the notifier.
    pub fn notifier(mut self, notifier: AuthNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the navigator used after a session teardown.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Sets the scraping history.
    pub fn history(mut self, history: ScrapingHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Whether the notifier follows session changes made by other contexts
    /// sharing the session medium. On by default.
    pub fn sync_contexts(mut self, enabled: bool) -> Self {
        self.sync_contexts = enabled;
        self
    }

    /// Builds the client.
    ///
    /// Cross-context sync only starts when called from within a tokio
    /// runtime.
    pub fn build(self) -> Result<FinDataClient, ApiError> {
        let session = self.session.unwrap_or_else(SessionStore::in_memory);
        let notifier = self.notifier.unwrap_or_default();

        if self.sync_contexts && !notifier.is_attached() {
            if tokio::runtime::Handle::try_current().is_ok() {
                notifier.attach(session.backend().as_ref(), session.keys().clone());
            } else {
                debug!("No runtime, cross-context sync disabled");
            }
        }

        let mut pipeline = RequestPipeline::builder(session)
            .config(&self.config)
            .notifier(notifier);
        if let Some(transport) = self.transport {
            pipeline = pipeline.transport(transport);
        }
        if let Some(navigator) = self.navigator {
            pipeline = pipeline.navigator(navigator);
        }
        let pipeline = pipeline.build()?;

        debug!(base_url = %self.config.api_base_url, "Client built");

        Ok(FinDataClient {
            config: Arc::new(self.config),
            pipeline: Arc::new(pipeline),
            history: self.history.unwrap_or_else(ScrapingHistory::in_memory),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
