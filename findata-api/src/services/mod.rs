//! Named operations of the REST API.
//!
//! Each service is a thin view over a [`FinDataClient`](crate::FinDataClient):
//! a fixed method, path and payload shape on top of the request pipeline.

mod auth;
mod dashboard;
mod health;
mod scraping;

pub use auth::AuthService;
pub use dashboard::{DashboardOverview, DashboardService};
pub use health::HealthService;
pub use scraping::{MAX_ARTICLES_LIMIT, ScrapingService};

use findata_core::{ErrorMessage, MessageCatalog, Outcome};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Turns an outcome into a typed payload.
///
/// A 2xx body with `success: false` is a client request failure carrying
/// the server's message.
pub(crate) fn decode<T: DeserializeOwned>(
    outcome: Outcome,
    messages: &MessageCatalog,
) -> Result<T, ApiError> {
    let (status, body) = match outcome {
        Outcome::Success { status, body } => (status, body),
        failure => {
            return Err(ApiError::from_outcome(failure, messages)
                .unwrap_or_else(|| ApiError::decode("unclassified outcome", messages)));
        }
    };

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(
                || messages.error(ErrorMessage::UnknownError).to_string(),
                str::to_string,
            );
        return Err(ApiError::ClientRequest { status, message });
    }

    serde_json::from_value(body).map_err(|e| ApiError::decode(e.to_string(), messages))
}

// ============================================================================
// Tests
// ============================================================================
