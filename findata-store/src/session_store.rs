//! Persisted session store.
//!
//! Reads and writes the token/user pair on a [`StorageBackend`]. The store
//! never notifies anyone; callers emit an auth transition after mutating.

use std::sync::Arc;

use findata_core::{Session, UserProfile};
use tracing::{debug, instrument, warn};

use crate::config::StorageKeys;
use crate::error::StoreError;
use crate::storage::{MemoryStorage, StorageBackend};

/// The persisted session of the current user.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
    keys: StorageKeys,
}

impl SessionStore {
    /// Creates a store on `backend` using the default keys.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_keys(backend, StorageKeys::default())
    }

    /// Creates a store on `backend` using custom keys.
    pub fn with_keys(backend: Arc<dyn StorageBackend>, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    /// Creates a store on a private in-memory medium.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Returns the underlying storage backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Returns the storage keys.
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Reads the current session.
    ///
    /// Unreadable, half-written or unparsable data is logged and reported as
    /// [`Session::Anonymous`].
    pub fn get(&self) -> Session {
        match self.try_get() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Ignoring unusable persisted session");
                Session::Anonymous
            }
        }
    }

    /// Reads the current session, reporting unusable data as an error.
    pub fn try_get(&self) -> Result<Session, StoreError> {
        let values = self
            .backend
            .get_items(&[self.keys.token.as_str(), self.keys.user.as_str()])?;
        let mut values = values.into_iter();
        let token = values.next().flatten();
        let user = values
            .next()
            .flatten()
            .map(|raw| serde_json::from_str::<UserProfile>(&raw))
            .transpose()?;

        Session::from_parts(token, user).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Returns the bearer token, if a valid session exists.
    pub fn token(&self) -> Option<String> {
        self.get().token().map(str::to_string)
    }

    /// Persists a new session. Token and user are written together.
    #[instrument(skip(self, token, user), fields(username = %user.username))]
    pub fn set(&self, token: &str, user: &UserProfile) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::Corrupt("refusing to store an empty token".to_string()));
        }
        let user_json = serde_json::to_string(user)?;
        self.backend.set_items(&[
            (self.keys.token.as_str(), token.to_string()),
            (self.keys.user.as_str(), user_json),
        ])?;
        debug!("Session stored");
        Ok(())
    }

    /// Removes the session. Clearing an empty store is a no-op.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend
            .remove_items(&[self.keys.token.as_str(), self.keys.user.as_str()])?;
        debug!("Session cleared");
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("context", &self.backend.context_id())
            .field("keys", &self.keys)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryMedium;

    fn alice() -> UserProfile {
        UserProfile::new("alice")
            .with_email("alice@example.com")
            .with_role("user")
    }

    #[test]
    fn test_empty_store_is_anonymous() {
        let store = SessionStore::in_memory();
        assert_eq!(store.get(), Session::Anonymous);
        assert!(store.token().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let store = SessionStore::in_memory();
        store.set("tok-1", &alice()).unwrap();

        let session = store.get();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok-1"));
        assert_eq!(session.user().unwrap().username, "alice");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory();
        store.clear().unwrap();

        store.set("tok-1", &alice()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.get(), Session::Anonymous);
    }

    #[test]
    fn test_half_session_is_anonymous() {
        let medium = MemoryMedium::new();
        let raw = medium.context();
        raw.set_items(&[("token", "orphan".to_string())]).unwrap();

        let store = SessionStore::new(Arc::new(medium.context()));
        assert_eq!(store.get(), Session::Anonymous);
        assert!(matches!(store.try_get(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_unparsable_user_is_anonymous() {
        let medium = MemoryMedium::new();
        let raw = medium.context();
        raw.set_items(&[
            ("token", "tok".to_string()),
            ("user", "{not json".to_string()),
        ])
        .unwrap();

        let store = SessionStore::new(Arc::new(medium.context()));
        assert_eq!(store.get(), Session::Anonymous);
    }

    #[test]
    fn test_empty_token_rejected() {
        let store = SessionStore::in_memory();
        assert!(store.set("", &alice()).is_err());
        assert_eq!(store.get(), Session::Anonymous);
    }

    #[test]
    fn test_custom_keys() {
        let keys = StorageKeys {
            token: "fd_token".to_string(),
            user: "fd_user".to_string(),
        };
        let medium = MemoryMedium::new();
        let store = SessionStore::with_keys(Arc::new(medium.context()), keys);
        store.set("tok", &alice()).unwrap();

        let raw = medium.context();
        assert_eq!(raw.get_item("fd_token").unwrap().as_deref(), Some("tok"));
        assert!(raw.get_item("token").unwrap().is_none());
    }
}
