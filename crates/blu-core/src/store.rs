//! Persistence boundary.
//!
//! The engine reads and writes three keys in one namespace. How values are
//! stored is up to the host; the core ships only an in-memory store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

/// Default namespace for all persisted keys.
pub const NAMESPACE: &str = "BluBlock";
/// Module state, power flag and current preset.
pub const PREFS_KEY: &str = "prefs";
/// The three aggregate counters.
pub const STATS_KEY: &str = "stats";
/// Serialized activity log.
pub const LOG_KEY: &str = "session_logs";

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value persistence collaborator.
pub trait Store {
    /// `Ok(None)` when the key has never been written.
    fn load(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value under `key`. Last write wins.
    fn save(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<(String, String), Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, e.g. to simulate a previous session.
    pub fn insert(&self, namespace: &str, key: &str, value: Value) {
        self.entries
            .borrow_mut()
            .insert((namespace.to_string(), key.to_string()), value);
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.entries
            .borrow()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }
}

impl Store for MemoryStore {
    fn load(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get(namespace, key))
    }

    fn save(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
        self.insert(namespace, key, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_key() {
        let store = MemoryStore::new();
        assert!(store.load(NAMESPACE, PREFS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.save(NAMESPACE, STATS_KEY, &json!({"blocked": 1})).unwrap();
        assert_eq!(view.get(NAMESPACE, STATS_KEY), Some(json!({"blocked": 1})));
    }

    #[test]
    fn test_namespaces_are_separate() {
        let store = MemoryStore::new();
        store.insert("a", LOG_KEY, json!([]));
        assert!(store.load("b", LOG_KEY).unwrap().is_none());
    }
}
