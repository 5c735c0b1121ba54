//! Integration tests for core session and outcome types.

use findata_core::{FailureKind, MessageCatalog, Outcome, Session, UserProfile};

#[test]
fn test_session_default_is_anonymous() {
    let session = Session::default();
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
}

#[test]
fn test_inconsistent_pair_is_rejected() {
    let result = Session::from_parts(Some("token".to_string()), None);
    assert!(result.is_err());
}

#[test]
fn test_outcome_message_comes_from_catalog() {
    let catalog = MessageCatalog::new();
    let outcome = Outcome::HttpFailure {
        status: 403,
        message: catalog.for_status(403).to_string(),
        detail: None,
    };

    assert_eq!(outcome.failure_kind(), Some(FailureKind::ClientRequest));
    assert!(matches!(outcome, Outcome::HttpFailure { ref message, .. } if message == "Access denied"));
}

#[test]
fn test_profile_builder() {
    let profile = UserProfile::new("carol")
        .with_email("carol@example.com")
        .with_role("premium");

    let session = Session::authenticated("t-1", profile);
    assert_eq!(session.user().and_then(|u| u.email.as_deref()), Some("carol@example.com"));
}
