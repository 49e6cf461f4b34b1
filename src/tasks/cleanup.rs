//! TTL Cleanup Task
//!
//! Background task that periodically removes expired in-memory store entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically purges expired entries.
///
/// Reads already skip expired entries, so the sweep only bounds memory held
/// by keys that are never read again.
///
/// # Arguments
/// * `store` - Handle sharing entries with the store used by the client
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, to be aborted on shutdown.
///
/// # Example
/// ```ignore
/// let store = MemoryStore::new();
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: MemoryStore, cleanup_interval_secs: u64) -> JoinHandle<()> {
    spawn_cleanup_every(store, Duration::from_secs(cleanup_interval_secs))
}

pub(crate) fn spawn_cleanup_every(store: MemoryStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = MemoryStore::new();

        store
            .set("expire_soon", "value".to_string(), Some(Duration::from_millis(50)))
            .await
            .unwrap();

        let handle = spawn_cleanup_every(store.clone(), Duration::from_millis(100));

        // Wait for entry to expire and cleanup to run
        tokio::time::sleep(Duration::from_millis(350)).await;

        // Checked via len so the lazy read path does not do the removal
        assert_eq!(store.len().await, 0, "Expired entry should have been cleaned up");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let store = MemoryStore::new();

        store
            .set("long_lived", "value".to_string(), Some(Duration::from_secs(3600)))
            .await
            .unwrap();

        let handle = spawn_cleanup_every(store.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        let value = store.get("long_lived").await.unwrap();
        assert_eq!(value.as_deref(), Some("value"), "Valid entry should not be removed");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(MemoryStore::new(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
