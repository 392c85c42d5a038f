//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use roleweave_core::{SessionStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A session store that keeps blobs in a map.
/// Nothing survives process exit.
pub struct InMemoryStore {
    blobs: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, session_id: &str, blob: serde_json::Value) -> Result<(), StoreError> {
        self.blobs
            .write()
            .await
            .insert(session_id.to_string(), blob);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.blobs.read().await.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        Ok(self.blobs.write().await.remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let store = InMemoryStore::new();
        store
            .put("sess-1", serde_json::json!({"turn": 3}))
            .await
            .unwrap();

        let blob = store.get("sess-1").await.unwrap();
        assert_eq!(blob, Some(serde_json::json!({"turn": 3})));
    }

    #[tokio::test]
    async fn get_unknown_is_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_replaces_existing() {
        let store = InMemoryStore::new();
        store.put("sess-1", serde_json::json!(1)).await.unwrap();
        store.put("sess-1", serde_json::json!(2)).await.unwrap();
        assert_eq!(store.get("sess-1").await.unwrap(), Some(serde_json::json!(2)));
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = InMemoryStore::new();
        store.put("sess-1", serde_json::json!(1)).await.unwrap();
        assert!(store.delete("sess-1").await.unwrap());
        assert!(!store.delete("sess-1").await.unwrap());
        assert_eq!(store.get("sess-1").await.unwrap(), None);
    }
}
