//! Article extraction.

use findata_core::{ExtractRequest, ExtractResponse};
use findata_fetch::RequestDescriptor;
use findata_store::HistoryEntry;
use tracing::{debug, info, instrument, warn};

use super::decode;
use crate::client::FinDataClient;
use crate::error::ApiError;
use crate::validate::validate_url;

/// Most articles the backend extracts in one run.
pub const MAX_ARTICLES_LIMIT: u32 = 100;

/// `POST /scraping/extract`.
pub struct ScrapingService<'a> {
    client: &'a FinDataClient,
}

impl<'a> ScrapingService<'a> {
    pub(crate) fn new(client: &'a FinDataClient) -> Self {
        Self { client }
    }

    /// Extracts articles from a site.
    ///
    /// The URL is normalized and checked before anything is sent, and the
    /// article limit is clamped to `1..=100`. The call uses the scraping
    /// timeout. A successful run is recorded in the local history.
    #[instrument(skip(self, request), fields(url = %request.url, method = %request.method))]
    pub async fn extract_articles(
        &self,
        request: ExtractRequest,
    ) -> Result<ExtractResponse, ApiError> {
        let config = self.client.config();
        let url = validate_url(&config.validation, &request.url)?;
        let request = ExtractRequest {
            url,
            max_articles: request.max_articles.clamp(1, MAX_ARTICLES_LIMIT),
            ..request
        };
        debug!(
            max_articles = request.max_articles,
            max_summaries = request.max_ia_summaries,
            timeout = ?config.scraping_timeout,
            "Starting extraction"
        );

        let pipeline = self.client.pipeline();
        let messages = pipeline.messages();
        let descriptor = RequestDescriptor::post_json("/scraping/extract", &request)
            .map_err(|e| ApiError::fetch(e, messages))?
            .with_timeout(config.scraping_timeout);
        let outcome = pipeline
            .execute(&descriptor)
            .await
            .map_err(|e| ApiError::fetch(e, messages))?;
        let response: ExtractResponse = decode(outcome, messages)?;

        info!(articles = response.articles.len(), "Extraction finished");

        if let Err(e) = self
            .client
            .history()
            .record(HistoryEntry::from_extract(&request, &response))
            .await
        {
            warn!(error = %e, "Failed to record scraping history");
        }

        Ok(response)
    }
}
