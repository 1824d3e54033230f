//! Listener registry: fully-qualified procedure path → active callback.
//!
//! Registrations are last-write-wins per path, but every registration gets
//! an identity token so a stale disposer held across a re-registration
//! becomes a no-op instead of removing the newer listener. Lookup clones the
//! callback out of the lock before it is invoked, so a listener may freely
//! register or unregister others from inside its own dispatch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Callback invoked with the positional arguments of one dispatched event.
pub type EventCallback = dyn Fn(Vec<Value>) + Send + Sync;

struct Entry {
    id: u64,
    callback: Arc<EventCallback>,
}

struct Inner {
    next_id: u64,
    listeners: HashMap<String, Entry>,
}

/// The only mutable shared state in the client core.
pub struct ListenerRegistry {
    inner: Mutex<Inner>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                listeners: HashMap::new(),
            }),
        }
    }

    /// Register `callback` for `path`, replacing (and silently dropping) any
    /// earlier registration at the same path. Returns the identity token the
    /// disposer checks against.
    pub fn register(&self, path: &str, callback: Arc<EventCallback>) -> u64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(path.to_string(), Entry { id, callback });
        id
    }

    /// Remove the registration at `path` only if `id` is still the one
    /// registered there. Idempotent: a second call, or a call after a newer
    /// registration took the path, changes nothing.
    pub fn remove_if_current(&self, path: &str, id: u64) -> bool {
        let mut inner = self.lock();
        match inner.listeners.get(path) {
            Some(entry) if entry.id == id => {
                inner.listeners.remove(path);
                true
            }
            _ => false,
        }
    }

    /// Remove whatever is registered at `path`, if anything.
    pub fn unregister(&self, path: &str) -> bool {
        self.lock().listeners.remove(path).is_some()
    }

    /// Current callback for `path`, cloned out of the lock.
    pub fn lookup(&self, path: &str) -> Option<Arc<EventCallback>> {
        self.lock()
            .listeners
            .get(path)
            .map(|entry| Arc::clone(&entry.callback))
    }

    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Callbacks run outside the lock, so a panicking listener cannot
        // poison it.
        self.inner.lock().expect("listener registry lock")
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer for one listener registration.
///
/// Explicit: dropping the handle leaves the listener registered; call
/// [`ListenerHandle::unsubscribe`] to remove it.
#[derive(Clone)]
pub struct ListenerHandle {
    registry: Arc<ListenerRegistry>,
    path: String,
    id: u64,
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("path", &self.path)
            .field("id", &self.id)
            .finish()
    }
}

impl ListenerHandle {
    pub(crate) fn new(registry: Arc<ListenerRegistry>, path: String, id: u64) -> Self {
        Self { registry, path, id }
    }

    /// Path this handle's registration was made under.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Remove exactly the registration this handle was returned for.
    /// Returns `false` if it was already removed or superseded.
    pub fn unsubscribe(&self) -> bool {
        self.registry.remove_if_current(&self.path, self.id)
    }
}
