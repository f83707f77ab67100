//! JSON-file storage backend.

use crate::{StateStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// File-backed store: a single JSON object persisted on every write.
///
/// The whole map is held in memory and flushed atomically-enough for a
/// single-process client (write to a temp file, then rename).
pub struct FileStore {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: PathBuf) -> StorageResult<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)
                .map_err(|e| StorageError::Encoding(format!("corrupt state file: {}", e)))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn flush(&self, data: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "Flushed state file");
        Ok(())
    }
}

impl StateStore for FileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.insert(key.to_string(), value.to_string());
        self.flush(&data)
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
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let existed = data.remove(key).is_some();
        if existed {
            self.flush(&data)?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStore::open(path.clone()).unwrap();
            store.set("auth-storage", r#"{"user":null}"#).unwrap();
        }

        let store = FileStore::open(path).unwrap();
        assert_eq!(
            store.get("auth-storage").unwrap().as_deref(),
            Some(r#"{"user":null}"#)
        );
    }

    #[test]
    fn test_delete_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStore::open(path.clone()).unwrap();
            store.set("k", "v").unwrap();
            assert!(store.delete("k").unwrap());
        }

        let store = FileStore::open(path).unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("missing.json")).unwrap();
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_open_corrupt_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(FileStore::open(path).is_err());
    }
}
