//! Pre-flight input validation.
//!
//! These checks only save a round trip. The backend stays the authority on
//! what it accepts.

use findata_store::ValidationRules;

use crate::error::ValidationError;

/// Normalizes and checks a target URL.
///
/// Surrounding whitespace is dropped and `https://` is assumed when no
/// `http://` or `https://` scheme is given. Returns the normalized URL.
pub fn validate_url(rules: &ValidationRules, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field: "url" });
    }

    let normalized = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if normalized.len() > rules.max_url_length {
        return Err(ValidationError::UrlTooLong {
            length: normalized.len(),
            max: rules.max_url_length,
        });
    }

    if !rules.url_matches(&normalized) {
        return Err(ValidationError::InvalidUrl(normalized));
    }

    Ok(normalized)
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// A sign-up form.
#[derive(Clone, Default)]
pub struct Registration {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Repeated password.
    pub confirm_password: String,
}

impl Registration {
    /// Creates a form whose confirmation equals the password.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            email: email.into(),
            confirm_password: password.clone(),
            password,
        }
    }

    /// Sets the repeated password.
    pub fn with_confirmation(mut self, confirm: impl Into<String>) -> Self {
        self.confirm_password = confirm.into();
        self
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Checks a sign-up form. The first failing field wins.
pub fn validate_registration(
    rules: &ValidationRules,
    form: &Registration,
) -> Result<(), ValidationError> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err(ValidationError::Missing { field: "username" });
    }
    if username.chars().count() < rules.min_username_length {
        return Err(ValidationError::TooShort {
            field: "username",
            min: rules.min_username_length,
        });
    }

    let email = form.email.trim();
    if email.is_empty() {
        return Err(ValidationError::Missing { field: "email" });
    }
    if !rules.email_matches(email) {
        return Err(ValidationError::InvalidEmail);
    }

    if form.password.is_empty() {
        return Err(ValidationError::Missing { field: "password" });
    }
    if form.password.chars().count() < rules.min_password_length {
        return Err(ValidationError::TooShort {
            field: "password",
            min: rules.min_password_length,
        });
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
