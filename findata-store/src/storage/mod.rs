//! Storage media for the persisted session.
//!
//! A storage medium is a durable key-value map shared by every context
//! (browser tab, CLI process) of the same user. Each backend is one
//! context's handle on the medium:
//!
//! - [`memory`] - In-process medium with any number of contexts
//! - [`file`] - JSON file shared across processes
//!
//! Mutations made through one handle are reported to every *other* handle
//! through [`StorageBackend::changes`], never to the handle that made them.

pub mod file;
pub mod memory;

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::warn;

use crate::error::StoreError;

pub use file::FileStorage;
pub use memory::{MemoryMedium, MemoryStorage};

/// Capacity of the change channels.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// Context Id
// ============================================================================

/// Identifies one context attached to a storage medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Changes made outside this process.
    pub const EXTERNAL: ContextId = ContextId(0);

    /// Allocates a fresh, process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Storage Change
// ============================================================================

/// A mutation of the medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// The context that made the change.
    pub origin: ContextId,
    /// Keys whose value changed.
    pub keys: Vec<String>,
}

impl StorageChange {
    /// Returns true if the change touched `key`.
    ///
    /// A change without keys is unspecific and touches everything.
    pub fn touches(&self, key: &str) -> bool {
        self.keys.is_empty() || self.keys.iter().any(|k| k == key)
    }
}

/// Stream of changes made by other contexts.
pub struct ChangeStream {
    rx: broadcast::Receiver<StorageChange>,
    own: ContextId,
}

impl ChangeStream {
    /// Creates a stream that skips changes made by `own`.
    pub fn new(rx: broadcast::Receiver<StorageChange>, own: ContextId) -> Self {
        Self { rx, own }
    }

    /// Waits for the next foreign change.
    ///
    /// Returns `None` once the medium is gone. A lagging receiver yields a
    /// change with no keys, meaning anything may have changed.
    pub async fn recv(&mut self) -> Option<StorageChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.origin == self.own => {}
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage change stream lagged");
                    return Some(StorageChange {
                        origin: ContextId::EXTERNAL,
                        keys: Vec::new(),
                    });
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ============================================================================
// Storage Backend
// ============================================================================

/// One context's handle on a shared key-value medium.
///
/// Multi-key writes and removals are atomic: a reader sees all of a write
/// or none of it.
pub trait StorageBackend: Send + Sync {
    /// Returns this handle's context id.
    fn context_id(&self) -> ContextId;

    /// Reads several keys as one consistent snapshot.
    fn get_items(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError>;

    /// Writes several keys atomically.
    fn set_items(&self, items: &[(&str, String)]) -> Result<(), StoreError>;

    /// Removes several keys atomically. Absent keys are ignored.
    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Subscribes to changes made by other contexts.
    fn changes(&self) -> ChangeStream;

    /// Reads a single key.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_items(&[key])?.into_iter().next().flatten())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_ids_are_unique() {
        let a = ContextId::next();
        let b = ContextId::next();
        assert_ne!(a, b);
        assert_ne!(a, ContextId::EXTERNAL);
    }

    #[tokio::test]
    async fn test_change_stream_skips_own_changes() {
        let (tx, rx) = broadcast::channel(8);
        let own = ContextId::next();
        let other = ContextId::next();
        let mut stream = ChangeStream::new(rx, own);

        tx.send(StorageChange {
            origin: own,
            keys: vec!["token".to_string()],
        })
        .unwrap();
        tx.send(StorageChange {
            origin: other,
            keys: vec!["user".to_string()],
        })
        .unwrap();
        drop(tx);

        let change = stream.recv().await.unwrap();
        assert_eq!(change.origin, other);
        assert!(change.touches("user"));
        assert!(stream.recv().await.is_none());
    }
}
