//! Handle registry for live sessions
//!
//! Handles are never reused within a process, so a stale handle can only
//! miss, never alias a newer session.

use crate::raw::SENTINEL_HANDLE;
use engine::Session;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Maps integer handles to the sessions that own the engine resources
pub struct HandleRegistry {
    sessions: Mutex<HashMap<u64, Session>>,
    next_handle: AtomicU64,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            // 0 is reserved as the open-failure sentinel
            next_handle: AtomicU64::new(SENTINEL_HANDLE + 1),
        }
    }

    /// Register a session and return its handle
    pub fn insert(&self, session: Session) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.sessions.lock().insert(handle, session);
        handle
    }

    /// Remove and return the session for a handle
    ///
    /// A second removal of the same handle yields `None`, which is how
    /// double-close gets rejected instead of reaching the engine.
    pub fn remove(&self, handle: u64) -> Option<Session> {
        self.sessions.lock().remove(&handle)
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::WatchOptions;
    use tempfile::TempDir;

    fn dummy_session(dir: &TempDir) -> Session {
        Session::open(dir.path(), WatchOptions::default(), Box::new(|_| {})).unwrap()
    }

    #[test]
    fn test_handles_are_unique_and_nonzero() {
        let dir = TempDir::new().unwrap();
        let registry = HandleRegistry::new();

        let a = registry.insert(dummy_session(&dir));
        let b = registry.insert(dummy_session(&dir));

        assert_ne!(a, SENTINEL_HANDLE);
        assert_ne!(b, SENTINEL_HANDLE);
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_consumes_the_session() {
        let dir = TempDir::new().unwrap();
        let registry = HandleRegistry::new();

        let handle = registry.insert(dummy_session(&dir));
        assert!(registry.remove(handle).is_some());
        assert!(registry.remove(handle).is_none());
    }

    #[test]
    fn test_unknown_handle_misses() {
        let registry = HandleRegistry::new();
        assert!(registry.remove(42).is_none());
        assert!(registry.remove(SENTINEL_HANDLE).is_none());
    }
}
