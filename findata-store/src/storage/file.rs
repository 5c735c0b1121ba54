//! File-backed storage medium.
//!
//! Items live in a single JSON object file. Every write replaces the file
//! atomically, so concurrent readers (including other processes) never see
//! a half-written session. Changes made by other processes are picked up by
//! a polling watcher and reported through [`StorageBackend::changes`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::{CHANGE_CHANNEL_CAPACITY, ChangeStream, ContextId, StorageBackend, StorageChange};
use crate::error::StoreError;
use crate::persistence::write_private;

/// Default interval between two polls of the watcher.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

type Items = BTreeMap<String, String>;

// ============================================================================
// File Storage
// ============================================================================

/// A storage medium persisted in a JSON file.
pub struct FileStorage {
    path: PathBuf,
    id: ContextId,
    /// Contents as last written or observed by this process.
    known: Mutex<Items>,
    events: broadcast::Sender<StorageChange>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl FileStorage {
    /// Opens (without creating) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Arc<Self>, StoreError> {
        let path = path.into();
        let known = read_items(&path)?;
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        debug!(path = %path.display(), items = known.len(), "Opened file storage");

        Ok(Arc::new(Self {
            path,
            id: ContextId::next(),
            known: Mutex::new(known),
            events,
            watcher: Mutex::new(None),
        }))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Starts polling the file for changes made by other processes.
    ///
    /// Must be called from within a tokio runtime. Calling it again
    /// replaces the previous watcher.
    pub fn spawn_watcher(self: &Arc<Self>, interval: Duration) {
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(watch_loop(weak, interval));

        let mut slot = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Stops the watcher, if any.
    pub fn stop_watcher(&self) {
        let mut slot = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    /// Re-reads the file and reports keys that differ from what this process
    /// last wrote or observed.
    pub fn poll(&self) -> Result<Option<StorageChange>, StoreError> {
        let current = read_items(&self.path)?;
        let mut known = self.known.lock().unwrap_or_else(PoisonError::into_inner);

        let keys = diff_keys(&known, &current);
        if keys.is_empty() {
            return Ok(None);
        }
        *known = current;
        drop(known);

        let change = StorageChange {
            origin: ContextId::EXTERNAL,
            keys,
        };
        debug!(keys = ?change.keys, "External change to session file");
        let _ = self.events.send(change.clone());
        Ok(Some(change))
    }

    /// Applies `mutate` to the current contents and writes the result.
    fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Items),
    {
        let mut known = self.known.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = read_items(&self.path)?;
        let before = items.clone();
        mutate(&mut items);

        let keys = diff_keys(&before, &items);
        if keys.is_empty() {
            *known = items;
            return Ok(());
        }

        if items.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            write_private(&self.path, &serde_json::to_string_pretty(&items)?)?;
        }
        *known = items;
        drop(known);

        let _ = self.events.send(StorageChange {
            origin: self.id,
            keys,
        });
        Ok(())
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        self.stop_watcher();
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl StorageBackend for FileStorage {
    fn context_id(&self) -> ContextId {
        self.id
    }

    fn get_items(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let items = read_items(&self.path)?;
        Ok(keys.iter().map(|k| items.get(*k).cloned()).collect())
    }

    #[instrument(skip(self, items), fields(path = %self.path.display()))]
    fn set_items(&self, items: &[(&str, String)]) -> Result<(), StoreError> {
        self.update(|current| {
            for (key, value) in items {
                current.insert((*key).to_string(), value.clone());
            }
        })
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.update(|current| {
            for key in keys {
                current.remove(*key);
            }
        })
    }

    fn changes(&self) -> ChangeStream {
        ChangeStream::new(self.events.subscribe(), self.id)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Reads the items file. A missing file is an empty medium.
fn read_items(path: &Path) -> Result<Items, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Items::new()),
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        return Ok(Items::new());
    }

    serde_json::from_str(&content)
        .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))
}

fn diff_keys(before: &Items, after: &Items) -> Vec<String> {
    let all: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    all.into_iter()
        .filter(|k| before.get(*k) != after.get(*k))
        .cloned()
        .collect()
}

async fn watch_loop(storage: Weak<FileStorage>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(storage) = storage.upgrade() else {
            break;
        };
        if let Err(e) = storage.poll() {
            warn!(path = %storage.path.display(), error = %e, "Failed to poll session file");
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
    fn test_set_get_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp_dir.path().join("session.json")).unwrap();

        storage
            .set_items(&[("token", "abc".to_string()), ("user", "{}".to_string())])
            .unwrap();
        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("abc"));
        assert!(storage.path().exists());

        storage.remove_items(&["token", "user"]).unwrap();
        assert!(storage.get_item("token").unwrap().is_none());
        assert!(!storage.path().exists());

        // Removing again is a no-op
        storage.remove_items(&["token", "user"]).unwrap();
    }

    #[test]
    fn test_two_handles_share_the_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        let first = FileStorage::open(&path).unwrap();
        let second = FileStorage::open(&path).unwrap();

        first.set_items(&[("token", "abc".to_string())]).unwrap();

        assert_eq!(second.get_item("token").unwrap().as_deref(), Some("abc"));

        let change = second.poll().unwrap().unwrap();
        assert_eq!(change.origin, ContextId::EXTERNAL);
        assert_eq!(change.keys, vec!["token".to_string()]);

        // Own writes are already known
        assert!(first.poll().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStorage::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_watcher_reports_external_changes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        let watched = FileStorage::open(&path).unwrap();
        let writer = FileStorage::open(&path).unwrap();

        let mut changes = watched.changes();
        watched.spawn_watcher(Duration::from_millis(10));

        writer.set_items(&[("token", "xyz".to_string())]).unwrap();

        let change = tokio::time::timeout(Duration::from_secs(2), changes.recv())
            .await
            .expect("watcher should report the change")
            .unwrap();
        assert!(change.touches("token"));
    }
}
