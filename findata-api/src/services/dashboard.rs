//! Dashboard data.

use findata_core::{AnalyticsResponse, StatsResponse};
use findata_fetch::RequestDescriptor;
use serde::Serialize;
use tracing::instrument;

use super::decode;
use crate::client::FinDataClient;
use crate::error::ApiError;

/// Stats and analytics fetched together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    /// `GET /dashboard/stats`.
    pub stats: StatsResponse,
    /// `GET /dashboard/analytics`.
    pub analytics: AnalyticsResponse,
}

/// Read-only dashboard calls.
pub struct DashboardService<'a> {
    client: &'a FinDataClient,
}

impl<'a> DashboardService<'a> {
    pub(crate) fn new(client: &'a FinDataClient) -> Self {
        Self { client }
    }

    /// Per-user counters and subscription details.
    #[instrument(skip(self))]
    pub async fn get_stats(&self) -> Result<StatsResponse, ApiError> {
        self.get("/dashboard/stats").await
    }

    /// Per-domain aggregates and past runs.
    #[instrument(skip(self))]
    pub async fn get_analytics(&self) -> Result<AnalyticsResponse, ApiError> {
        self.get("/dashboard/analytics").await
    }

    /// Fetches stats and analytics concurrently.
    ///
    /// Each is its own logical call with its own retries. Fails with the
    /// first error.
    pub async fn overview(&self) -> Result<DashboardOverview, ApiError> {
        let (stats, analytics) = futures::try_join!(self.get_stats(), self.get_analytics())?;
        Ok(DashboardOverview { stats, analytics })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let pipeline = self.client.pipeline();
        let outcome = pipeline
            .execute(&RequestDescriptor::get(path))
            .await
            .map_err(|e| ApiError::fetch(e, pipeline.messages()))?;
        decode(outcome, pipeline.messages())
    }
}
