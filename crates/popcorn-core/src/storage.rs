use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-wide key-value persistence.
///
/// Values are opaque strings (JSON in practice). Features must use disjoint keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

/// Percent-encode the key so distinct keys never share a file and none escapes the directory
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store miss: {} ({} does not exist)", key, path.display());
                Ok(None)
            }
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        // Atomic write: write to temp file, then rename
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value).map_err(|e| io_error(&temp_path, e))?;
        std::fs::rename(&temp_path, &path).map_err(|e| io_error(&path, e))?;

        debug!("Store saved: {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("watched").unwrap(), None);
        store.set("watched", "[]").unwrap();
        assert_eq!(store.get("watched").unwrap().as_deref(), Some("[]"));
        store.remove("watched").unwrap();
        assert_eq!(store.get("watched").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(&dir.path().join("store"));

        assert_eq!(store.get("watched").unwrap(), None);
        store.set("watched", r#"[{"imdbID":"tt1"}]"#).unwrap();
        assert_eq!(store.get("watched").unwrap().as_deref(), Some(r#"[{"imdbID":"tt1"}]"#));
        assert!(dir.path().join("store").join("watched.json").exists());

        store.set("watched", "[]").unwrap();
        assert_eq!(store.get("watched").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_encodes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("../escape/attempt", "1").unwrap();
        assert!(dir.path().join("..%2Fescape%2Fattempt.json").exists());
        assert_eq!(store.get("../escape/attempt").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_file_store_keeps_similar_keys_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("watched.v2", "[1]").unwrap();
        store.set("watched_v2", "[2]").unwrap();
        store.set("a/b", "[3]").unwrap();
        store.set("a_b", "[4]").unwrap();

        assert_eq!(store.get("watched.v2").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("watched_v2").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.get("a/b").unwrap().as_deref(), Some("[3]"));
        assert_eq!(store.get("a_b").unwrap().as_deref(), Some("[4]"));
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("watched"), "watched");
        assert_eq!(encode_key("watched.v2"), "watched.v2");
        assert_eq!(encode_key("a/b"), "a%2Fb");
        assert_eq!(encode_key("100%"), "100%25");
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.remove("nothing").is_ok());
    }
}
