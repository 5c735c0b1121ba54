//! Authentication lifecycle.

use findata_core::{Ack, LoginRequest, LoginResponse, RegisterRequest, Session, UserProfile};
use findata_fetch::RequestDescriptor;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::decode;
use crate::client::FinDataClient;
use crate::error::{ApiError, ValidationError};
use crate::validate::{Registration, validate_registration};

/// Login, logout and sign-up.
pub struct AuthService<'a> {
    client: &'a FinDataClient,
}

impl<'a> AuthService<'a> {
    pub(crate) fn new(client: &'a FinDataClient) -> Self {
        Self { client }
    }

    /// Logs in and persists the session.
    ///
    /// On success the token and profile are stored together and local
    /// subscribers are notified.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        if username.trim().is_empty() {
            return Err(ValidationError::Missing { field: "username" }.into());
        }
        if password.is_empty() {
            return Err(ValidationError::Missing { field: "password" }.into());
        }

        let pipeline = self.client.pipeline();
        let messages = pipeline.messages();
        let descriptor = RequestDescriptor::post_json(
            "/auth/login",
            &LoginRequest {
                username: username.trim().to_string(),
                password: password.to_string(),
            },
        )
        .map_err(|e| ApiError::fetch(e, messages))?;
        let outcome = pipeline
            .execute(&descriptor)
            .await
            .map_err(|e| ApiError::fetch(e, messages))?;
        let response: LoginResponse = decode(outcome, messages)?;

        let (Some(token), Some(user)) = (response.access_token, response.user) else {
            return Err(ApiError::decode("login response without token or user", messages));
        };

        self.client
            .session()
            .set(&token, &user)
            .map_err(|e| ApiError::store(e, messages))?;
        self.client.notifier().notify_local();
        info!(username = %user.username, "Logged in");

        Ok(user)
    }

    /// Logs out.
    ///
    /// The local session is always cleared and local subscribers notified,
    /// even if the server call fails. That failure is still returned.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let pipeline = self.client.pipeline();
        let descriptor = RequestDescriptor::post("/auth/logout", json!({}));
        let call = pipeline.call(&descriptor, pipeline.retry_strategy()).await;

        // A 401 already tore the session down and notified
        let torn_down = call.as_ref().is_ok_and(|c| c.report.session_cleared);
        if !torn_down {
            let cleared = self.client.session().clear();
            self.client.notifier().notify_local();
            cleared.map_err(|e| ApiError::store(e, pipeline.messages()))?;
        }

        let call = call.map_err(|e| ApiError::fetch(e, pipeline.messages()))?;
        let result = decode::<Ack>(call.outcome, pipeline.messages());
        match &result {
            Ok(_) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Server logout failed, local session cleared"),
        }
        result.map(|_| ())
    }

    /// Creates an account after checking the form locally.
    ///
    /// Does not log in.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &Registration) -> Result<Ack, ApiError> {
        let rules = &self.client.config().validation;
        validate_registration(rules, form)?;

        let pipeline = self.client.pipeline();
        let messages = pipeline.messages();
        let descriptor = RequestDescriptor::post_json(
            "/auth/register",
            &RegisterRequest {
                username: form.username.trim().to_string(),
                password: form.password.clone(),
                email: form.email.trim().to_string(),
            },
        )
        .map_err(|e| ApiError::fetch(e, messages))?;
        let outcome = pipeline
            .execute(&descriptor)
            .await
            .map_err(|e| ApiError::fetch(e, messages))?;
        let ack: Ack = decode(outcome, messages)?;

        info!("Account created");
        Ok(ack)
    }

    /// Reads the persisted session.
    pub fn current_session(&self) -> Session {
        self.client.session().get()
    }
}
