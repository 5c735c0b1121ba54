//! JSON output formatting.

use anyhow::Result;
use findata_api::ApiError;
use findata_core::{FailureKind, Session, UserProfile};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// The stored session, without its token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutput<'a> {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<&'a UserProfile>,
}

impl<'a> From<&'a Session> for SessionOutput<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            authenticated: session.is_authenticated(),
            user: session.user(),
        }
    }
}

/// A failed operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&ApiError> for ErrorOutput {
    fn from(error: &ApiError) -> Self {
        Self {
            error: error.to_string(),
            kind: error.kind(),
            status: error.status(),
        }
    }
}

// ============================================================================
// Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serializes any value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(data)?)
        } else {
            Ok(serde_json::to_string(data)?)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let output = formatter.format(&json!({"success": true})).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format(&json!({"success": true})).unwrap();
        assert_eq!(output, r#"{"success":true}"#);
    }

    #[test]
    fn test_session_output_hides_token() {
        let session = Session::authenticated("secret-token", UserProfile::new("alice"));
        let output = JsonFormatter::new(false)
            .format(&SessionOutput::from(&session))
            .unwrap();
        assert!(output.contains(r#""authenticated":true"#));
        assert!(output.contains("alice"));
        assert!(!output.contains("secret-token"));
    }

    #[test]
    fn test_error_output() {
        let error = ApiError::Server {
            status: 503,
            message: "An unexpected error occurred".to_string(),
        };
        let output = JsonFormatter::new(false)
            .format(&ErrorOutput::from(&error))
            .unwrap();
        assert_eq!(
            output,
            r#"{"error":"An unexpected error occurred","kind":"server","status":503}"#
        );
    }
}
