//! In-memory view store.

use std::collections::HashMap;

use async_trait::async_trait;
use colkeeper_protocols::{StorageError, ViewStore};
use serde_json::Value;
use tokio::sync::RwLock;

/// Process-local [`ViewStore`]; contents are lost on exit.
pub struct MemoryViewStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryViewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ViewStore for MemoryViewStore {
    fn id(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemoryViewStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", json!(["a", "b"])).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(["a", "b"])));

        store.set("k", json!([])).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!([])));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_missing_key() {
        let store = MemoryViewStore::default();
        store.remove("never-set").await.unwrap();
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_keys_sorted() {
        let store = MemoryViewStore::new();
        store.set("b", json!(1)).await.unwrap();
        store.set("a", json!(2)).await.unwrap();
        assert_eq!(store.keys().await, vec!["a", "b"]);
        assert_eq!(store.id(), "memory");
    }
}
