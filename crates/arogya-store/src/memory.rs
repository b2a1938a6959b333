//! In-process key-value store.
//!
//! Used by tests and by the engine when no external store is configured.
//! Contents live as long as the process.

use std::collections::BTreeMap;

use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// A [`KeyValueStore`] backed by a mutex-guarded [`BTreeMap`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", String::from("v1")).await.unwrap();
        store.set("k", String::from("v2")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len().await, 1);

        store.delete("k").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn deleting_missing_key_is_fine() {
        let store = MemoryStore::new();
        assert!(store.delete("nothing-here").await.is_ok());
    }
}
