//! Memory Store Module
//!
//! In-process [`Store`] backed by a shared map, with lazy and periodic TTL
//! expiry. Useful for tests and single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{Store, StoredEntry};

// == Memory Store ==
/// Shared in-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of entries held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    // == Get ==
    /// Expired entries are removed and reported as absent.
    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Re-check under the write lock; a concurrent set may have replaced it.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    // == Set ==
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let entry = StoredEntry::new(value, ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    // == Delete ==
    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    // == Expiry Of ==
    async fn expiry_of(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(|entry| entry.expires_at))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = MemoryStore::new();

        store.set("key1", "value1".to_string(), None).await.unwrap();
        let value = store.get("key1").await.unwrap();

        assert_eq!(value.as_deref(), Some("value1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = MemoryStore::new();
        assert!(store.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_delete() {
        let store = MemoryStore::new();

        store.set("key1", "value1".to_string(), None).await.unwrap();
        store.delete("key1").await.unwrap();

        assert!(store.is_empty().await);
        assert!(store.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_delete_nonexistent() {
        let store = MemoryStore::new();
        assert!(store.delete("nonexistent").await.is_ok());
    }

    #[tokio::test]
    async fn test_store_overwrite_resets_ttl() {
        let store = MemoryStore::new();

        store
            .set("key1", "value1".to_string(), Some(Duration::from_secs(60)))
            .await
            .unwrap();
        store.set("key1", "value2".to_string(), None).await.unwrap();

        assert_eq!(store.get("key1").await.unwrap().as_deref(), Some("value2"));
        assert!(store.expiry_of("key1").await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let store = MemoryStore::new();

        store
            .set("key1", "value1".to_string(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(store.get("key1").await.unwrap().is_some());

        sleep(Duration::from_millis(80)).await;

        assert!(store.get("key1").await.unwrap().is_none());
        // The lazy read removed it.
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_expiry_of() {
        let store = MemoryStore::new();
        let before = Utc::now();

        store
            .set("ttl", "v".to_string(), Some(Duration::from_secs(120)))
            .await
            .unwrap();
        store.set("forever", "v".to_string(), None).await.unwrap();

        let expires = store.expiry_of("ttl").await.unwrap().unwrap();
        assert!(expires >= before + chrono::Duration::seconds(120));
        assert!(expires <= Utc::now() + chrono::Duration::seconds(120));

        assert!(store.expiry_of("forever").await.unwrap().is_none());
        assert!(store.expiry_of("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_cleanup_expired() {
        let store = MemoryStore::new();

        store
            .set("key1", "value1".to_string(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        store
            .set("key2", "value2".to_string(), Some(Duration::from_secs(10)))
            .await
            .unwrap();

        sleep(Duration::from_millis(80)).await;

        let removed = store.cleanup_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("key2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("shared", "v".to_string(), None).await.unwrap();
        assert_eq!(other.get("shared").await.unwrap().as_deref(), Some("v"));
    }
}
