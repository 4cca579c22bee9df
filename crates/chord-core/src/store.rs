//! The local key-value map. Ownership is enforced by the router, not here.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn put(&self, key: String, value: Vec<u8>);
}

/// An in-memory `Store` backed by a single `RwLock<HashMap>`. Satisfies the
/// "get/put each atomic" discipline; no cross-key transactions are needed.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.read().await.get(key).cloned()
    }

    async fn put(&self, key: String, value: Vec<u8>) {
        self.inner.write().await.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let store = MemoryStore::new();
        store.put("k".to_string(), b"v".to_vec()).await;
        assert_eq!(store.get("k").await, Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn get_absent_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await, None);
    }

    #[tokio::test]
    async fn put_overwrites_prior_value() {
        let store = MemoryStore::new();
        store.put("k".to_string(), b"v1".to_vec()).await;
        store.put("k".to_string(), b"v2".to_vec()).await;
        assert_eq!(store.get("k").await, Some(b"v2".to_vec()));
    }
}
