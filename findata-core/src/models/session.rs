//! Session-related types.
//!
//! - [`Session`] - Either anonymous or a token paired with its user
//! - [`UserProfile`] - Profile returned by the login endpoint
//! - [`SubscriptionStatus`] - Plan summary attached to a profile

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ============================================================================
// User Profile
// ============================================================================

/// Plan summary returned alongside a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    /// Plan name (mirrors the role).
    #[serde(default)]
    pub plan: Option<String>,
    /// Number of scraping requests allowed.
    #[serde(default)]
    pub requests_limit: Option<u64>,
    /// Number of scraping requests already consumed.
    #[serde(default)]
    pub requests_used: Option<u64>,
}

/// A user profile as persisted with the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login name.
    pub username: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role, e.g. `free` or `premium`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Subscription summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionStatus>,
    /// Any other fields the server sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Creates a profile with only a username.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            role: None,
            subscription: None,
            extra: Map::new(),
        }
    }

    /// Sets the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

// ============================================================================
// Session
// ============================================================================

/// The current authentication state.
///
/// The token and user are always set or cleared together, so there is no
/// way to represent one without the other.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    /// No credential is held.
    #[default]
    Anonymous,
    /// A bearer token and the profile it belongs to.
    Authenticated {
        /// Opaque bearer token.
        token: String,
        /// Profile of the logged-in user.
        user: UserProfile,
    },
}

impl Session {
    /// Creates an authenticated session.
    pub fn authenticated(token: impl Into<String>, user: UserProfile) -> Self {
        Self::Authenticated {
            token: token.into(),
            user,
        }
    }

    /// Builds a session from separately stored parts.
    ///
    /// Returns an error when exactly one half of the pair is present or the
    /// token is empty. Callers treat that as "no session".
    pub fn from_parts(
        token: Option<String>,
        user: Option<UserProfile>,
    ) -> Result<Self, CoreError> {
        match (token, user) {
            (None, None) => Ok(Self::Anonymous),
            (Some(token), Some(user)) if !token.is_empty() => Ok(Self::Authenticated { token, user }),
            (Some(_), Some(_)) => Err(CoreError::InconsistentSession(
                "empty token".to_string(),
            )),
            (Some(_), None) => Err(CoreError::InconsistentSession(
                "token without user".to_string(),
            )),
            (None, Some(_)) => Err(CoreError::InconsistentSession(
                "user without token".to_string(),
            )),
        }
    }

    /// Returns true if a credential is held.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Returns the bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }

    /// Returns the user profile, if any.
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_consistent() {
        let session =
            Session::from_parts(Some("abc".to_string()), Some(UserProfile::new("alice"))).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.user().map(|u| u.username.as_str()), Some("alice"));

        let empty = Session::from_parts(None, None).unwrap();
        assert_eq!(empty, Session::Anonymous);
        assert!(empty.token().is_none());
    }

    #[test]
    fn test_from_parts_inconsistent() {
        assert!(Session::from_parts(Some("abc".to_string()), None).is_err());
        assert!(Session::from_parts(None, Some(UserProfile::new("alice"))).is_err());
        assert!(Session::from_parts(Some(String::new()), Some(UserProfile::new("bob"))).is_err());
    }

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let json = r#"{
            "username": "alice",
            "email": "alice@example.com",
            "role": "premium",
            "subscription": {"plan": "premium", "requests_limit": 100, "requests_used": 3},
            "avatar": "a.png"
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.role.as_deref(), Some("premium"));
        assert_eq!(
            profile.subscription.as_ref().and_then(|s| s.requests_limit),
            Some(100)
        );
        assert_eq!(profile.extra.get("avatar"), Some(&Value::from("a.png")));

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["avatar"], "a.png");
    }
}
