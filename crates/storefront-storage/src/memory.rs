//! In-memory storage backend.

use crate::{StateStore, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Ephemeral in-memory store. State does not survive the process.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self
            .data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = MemoryStore::new();

        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert!(store.has("k").unwrap());

        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert!(!store.has("k").unwrap());
    }

    #[test]
    fn test_overwrite() {
        let store = MemoryStore::new();
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }
}
