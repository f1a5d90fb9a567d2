use popcorn_models::{WatchedRecord, WatchedSummary};
use std::sync::Arc;
use tracing::info;

use crate::persisted::PersistedValue;
use crate::storage::{KeyValueStore, StoreError};

/// Key the watched list is stored under
pub const WATCHED_KEY: &str = "watched";

/// The user's watched list, written through to the store on every change.
///
/// Records keep insertion order. The store does not deduplicate; callers check
/// [`WatchedStore::contains`] before adding.
pub struct WatchedStore {
    value: PersistedValue<Vec<WatchedRecord>>,
}

impl WatchedStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, WATCHED_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let value = PersistedValue::load(store, key, Vec::new());
        info!("Watched list '{}' has {} records", key, value.get().len());
        Self { value }
    }

    pub fn items(&self) -> &[WatchedRecord] {
        self.value.get()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedRecord> {
        self.items().iter().find(|r| r.imdb_id == imdb_id)
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.get(imdb_id).is_some()
    }

    pub fn add(&mut self, record: WatchedRecord) -> Result<(), StoreError> {
        info!("Adding '{}' ({}) to watched list", record.title, record.imdb_id);
        self.value.update(|items| items.push(record))
    }

    /// Drop every record with this ID. Unknown IDs are a no-op.
    pub fn remove(&mut self, imdb_id: &str) -> Result<(), StoreError> {
        self.value.update(|items| items.retain(|r| r.imdb_id != imdb_id))
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.value.set(Vec::new())
    }

    pub fn summary(&self) -> WatchedSummary {
        WatchedSummary::from_records(self.items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use crate::test_support::FailingStore;
    use popcorn_models::UserRating;

    fn record(imdb_id: &str, user_rating: u8) -> WatchedRecord {
        WatchedRecord {
            imdb_id: imdb_id.to_string(),
            title: format!("Title {}", imdb_id),
            year: "2000".to_string(),
            poster: None,
            imdb_rating: Some(7.0),
            runtime: Some(110),
            user_rating: UserRating::new(user_rating).ok(),
            count_rating_decisions: 1,
            added_at: None,
        }
    }

    #[test]
    fn test_add_then_remove_empties_collection_and_snapshot() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut watched = WatchedStore::load(Arc::clone(&store));

        watched.add(record("tt1", 8)).unwrap();
        assert_eq!(watched.len(), 1);
        assert!(watched.contains("tt1"));

        watched.remove("tt1").unwrap();
        assert!(watched.is_empty());
        assert_eq!(store.get(WATCHED_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_reload_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));

        let mut watched = WatchedStore::load(Arc::clone(&store));
        watched.add(record("tt3", 5)).unwrap();
        watched.add(record("tt1", 9)).unwrap();
        watched.add(record("tt2", 7)).unwrap();
        let before = watched.items().to_vec();

        let reloaded = WatchedStore::load(store);
        assert_eq!(reloaded.items(), before.as_slice());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut watched = WatchedStore::load(store);
        watched.add(record("tt1", 8)).unwrap();
        watched.add(record("tt2", 6)).unwrap();

        watched.remove("tt1").unwrap();
        let once = watched.items().to_vec();
        watched.remove("tt1").unwrap();
        assert_eq!(watched.items(), once.as_slice());

        watched.remove("tt-unknown").unwrap();
        assert_eq!(watched.items(), once.as_slice());
    }

    #[test]
    fn test_add_does_not_dedupe() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut watched = WatchedStore::load(store);
        watched.add(record("tt1", 8)).unwrap();
        watched.add(record("tt1", 3)).unwrap();
        assert_eq!(watched.len(), 2);

        // remove drops every match
        watched.remove("tt1").unwrap();
        assert!(watched.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(WATCHED_KEY, r#"{"not": "a list"}"#).unwrap();
        let watched = WatchedStore::load(store);
        assert!(watched.is_empty());
    }

    #[test]
    fn test_summary() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut watched = WatchedStore::load(store);
        watched.add(record("tt1", 8)).unwrap();
        watched.add(record("tt2", 6)).unwrap();

        let summary = watched.summary();
        assert_eq!(summary.count, 2);
        assert!((summary.avg_user_rating - 7.0).abs() < 1e-9);
        assert!((summary.avg_runtime - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_write_keeps_in_memory_change() {
        let store: Arc<dyn KeyValueStore> = Arc::new(FailingStore);
        let mut watched = WatchedStore::load(store);

        assert!(watched.add(record("tt1", 8)).is_err());
        assert_eq!(watched.len(), 1);
        assert!(watched.contains("tt1"));

        assert!(watched.remove("tt1").is_err());
        assert!(watched.is_empty());
    }
}
