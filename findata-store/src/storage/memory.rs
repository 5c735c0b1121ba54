//! In-process storage medium.
//!
//! A [`MemoryMedium`] plays the role of the browser's origin storage: any
//! number of contexts ("tabs") attach to it, all see the same items, and
//! each is told about the mutations made by the others.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use tracing::trace;

use super::{CHANGE_CHANNEL_CAPACITY, ChangeStream, ContextId, StorageBackend, StorageChange};
use crate::error::StoreError;

// ============================================================================
// Medium
// ============================================================================

struct MediumInner {
    items: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StorageChange>,
}

/// A shared in-memory key-value medium.
#[derive(Clone)]
pub struct MemoryMedium {
    inner: Arc<MediumInner>,
}

impl MemoryMedium {
    /// Creates an empty medium.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(MediumInner {
                items: RwLock::new(HashMap::new()),
                events,
            }),
        }
    }

    /// Attaches a new context to the medium.
    pub fn context(&self) -> MemoryStorage {
        MemoryStorage {
            medium: Arc::clone(&self.inner),
            id: ContextId::next(),
        }
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryMedium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMedium")
            .field("items", &self.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Context Handle
// ============================================================================

/// One context attached to a [`MemoryMedium`].
pub struct MemoryStorage {
    medium: Arc<MediumInner>,
    id: ContextId,
}

impl MemoryStorage {
    /// Creates a standalone context on a private medium.
    pub fn new() -> Self {
        MemoryMedium::new().context()
    }

    fn publish(&self, keys: Vec<String>) {
        if keys.is_empty() {
            return;
        }
        trace!(origin = ?self.id, ?keys, "Memory storage changed");
        // No receivers is fine
        let _ = self.medium.events.send(StorageChange {
            origin: self.id,
            keys,
        });
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl StorageBackend for MemoryStorage {
    fn context_id(&self) -> ContextId {
        self.id
    }

    fn get_items(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let items = self
            .medium
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(keys.iter().map(|k| items.get(*k).cloned()).collect())
    }

    fn set_items(&self, new_items: &[(&str, String)]) -> Result<(), StoreError> {
        let changed = {
            let mut items = self
                .medium
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let mut changed = Vec::new();
            for (key, value) in new_items {
                let previous = items.insert((*key).to_string(), value.clone());
                if previous.as_ref() != Some(value) {
                    changed.push((*key).to_string());
                }
            }
            changed
        };
        self.publish(changed);
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError> {
        let changed = {
            let mut items = self
                .medium
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            keys.iter()
                .filter(|k| items.remove(**k).is_some())
                .map(|k| (*k).to_string())
                .collect::<Vec<_>>()
        };
        self.publish(changed);
        Ok(())
    }

    fn changes(&self) -> ChangeStream {
        ChangeStream::new(self.medium.events.subscribe(), self.id)
    }
}

// ============================================================================
// Tests
// ============================================================================
