//! Auth state notifier.
//!
//! Delivers "the session may have changed" wake-ups along two paths:
//!
//! 1. **Local**: [`AuthNotifier::notify_local`] fans out synchronously to
//!    every subscriber, right after this context mutated the session.
//! 2. **Cross-context**: once [`AuthNotifier::attach`]ed to a storage
//!    backend, a forwarding task turns the backend's change stream (changes
//!    made by *other* contexts) into deliveries.
//!
//! Transitions carry no session data. Subscribers re-read the
//! [`SessionStore`](crate::SessionStore).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::StorageKeys;
use crate::storage::StorageBackend;

// ============================================================================
// Transition
// ============================================================================

/// How a transition reached this context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionSource {
    /// Emitted by this context after its own mutation.
    Local,
    /// Observed on the shared storage medium, made by another context.
    CrossContext,
}

impl std::fmt::Display for TransitionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::CrossContext => write!(f, "cross-context"),
        }
    }
}

/// A wake-up signal: re-evaluate whether a session exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTransition {
    /// Delivery path.
    pub source: TransitionSource,
}

/// Handle returned by [`AuthNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(AuthTransition) + Send + Sync>;

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
struct Listeners {
    local: BTreeMap<SubscriptionId, Listener>,
    cross_context: BTreeMap<SubscriptionId, Listener>,
}

struct NotifierInner {
    listeners: Mutex<Listeners>,
    next_id: AtomicU64,
    version: watch::Sender<u64>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for NotifierInner {
    fn drop(&mut self) {
        let slot = self
            .forwarder
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

/// Process-wide auth state notifier. Cheap to clone.
#[derive(Clone)]
pub struct AuthNotifier {
    inner: Arc<NotifierInner>,
}

impl Default for AuthNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthNotifier {
    /// Creates a notifier with no subscribers and no attached medium.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(NotifierInner {
                listeners: Mutex::new(Listeners::default()),
                next_id: AtomicU64::new(1),
                version,
                forwarder: Mutex::new(None),
            }),
        }
    }

    /// Registers `listener` on both delivery paths.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(AuthTransition) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(listener);

        let mut listeners = self.lock_listeners();
        listeners.local.insert(id, Arc::clone(&listener));
        listeners.cross_context.insert(id, listener);
        trace!(?id, "Auth listener subscribed");
        id
    }

    /// Removes a listener from both paths.
    ///
    /// Returns false if it was not registered. Safe to call repeatedly and
    /// from inside a listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let local = listeners.local.remove(&id).is_some();
        let cross = listeners.cross_context.remove(&id).is_some();
        local || cross
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock_listeners().local.len()
    }

    /// Fans out a local transition to every subscriber.
    pub fn notify_local(&self) {
        self.deliver(TransitionSource::Local);
    }

    /// Subscribes to a version counter bumped on every delivery.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    /// Forwards session changes made by other contexts of `backend`'s medium.
    ///
    /// Only changes touching a session key are forwarded. Must be called from
    /// within a tokio runtime. Replaces any previous attachment.
    pub fn attach(&self, backend: &dyn StorageBackend, keys: StorageKeys) {
        let mut stream = backend.changes();
        let weak: Weak<NotifierInner> = Arc::downgrade(&self.inner);
        let context = backend.context_id();

        let handle = tokio::spawn(async move {
            while let Some(change) = stream.recv().await {
                if !change.keys.is_empty() && !change.keys.iter().any(|k| keys.contains(k)) {
                    continue;
                }
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                debug!(origin = ?change.origin, keys = ?change.keys, "Session changed in another context");
                AuthNotifier { inner }.deliver(TransitionSource::CrossContext);
            }
        });

        debug!(?context, "Auth notifier attached to storage");
        let mut slot = self
            .inner
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Stops forwarding cross-context changes.
    pub fn detach(&self) {
        let mut slot = self
            .inner
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    /// Returns true while a forwarder is running.
    pub fn is_attached(&self) -> bool {
        self.inner
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn deliver(&self, source: TransitionSource) {
        // Snapshot so listeners may (un)subscribe while being called
        let targets: Vec<Listener> = {
            let listeners = self.lock_listeners();
            let list = match source {
                TransitionSource::Local => &listeners.local,
                TransitionSource::CrossContext => &listeners.cross_context,
            };
            list.values().cloned().collect()
        };

        trace!(%source, listeners = targets.len(), "Delivering auth transition");
        let transition = AuthTransition { source };
        for listener in targets {
            listener(transition);
        }

        // Bumped last so watchers observe listener side effects
        self.inner.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Listeners> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AuthNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthNotifier")
            .field("listeners", &self.listener_count())
            .field("attached", &self.is_attached())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
