//! Backend health.

use findata_core::HealthResponse;
use findata_fetch::RequestDescriptor;
use tracing::instrument;

use super::decode;
use crate::client::FinDataClient;
use crate::error::ApiError;

/// `GET /health`.
pub struct HealthService<'a> {
    client: &'a FinDataClient,
}

impl<'a> HealthService<'a> {
    pub(crate) fn new(client: &'a FinDataClient) -> Self {
        Self { client }
    }

    /// Asks the backend for its status. Retried like any other call.
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> Result<HealthResponse, ApiError> {
        let pipeline = self.client.pipeline();
        let outcome = pipeline
            .execute(&RequestDescriptor::get("/health"))
            .await
            .map_err(|e| ApiError::fetch(e, pipeline.messages()))?;
        decode(outcome, pipeline.messages())
    }
}
