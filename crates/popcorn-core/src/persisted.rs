//! A single value mirrored to a [`KeyValueStore`] on every change.
//!
//! On load the stored snapshot is read back; a missing or unparseable
//! snapshot falls back to the initial value and never fails the caller.
//! Every change writes the whole value back under the same key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::storage::{KeyValueStore, StoreError};

pub struct PersistedValue<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        let value = match store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    info!("Loaded persisted value '{}'", key);
                    value
                }
                Err(e) => {
                    warn!("Discarding unparseable snapshot for '{}': {}", key, e);
                    initial
                }
            },
            Ok(None) => {
                debug!("No snapshot for '{}', using initial value", key);
                initial
            }
            Err(e) => {
                warn!("Failed to read snapshot for '{}': {}. Using initial value.", key, e);
                initial
            }
        };

        Self { store, key, value }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value, then write it through.
    ///
    /// The new value is kept in memory even if the write fails.
    pub fn set(&mut self, value: T) -> Result<(), StoreError> {
        self.value = value;
        self.persist()
    }

    /// Mutate the value in place, then write it through.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> Result<(), StoreError> {
        f(&mut self.value);
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.value).map_err(|source| StoreError::Serialize {
            key: self.key.clone(),
            source,
        })?;

        self.store.set(&self.key, &json).map_err(|e| {
            warn!("Failed to persist '{}': {}", self.key, e);
            e
        })
    }
}
