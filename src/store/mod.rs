//! Store Module
//!
//! The backing key-value store contract, plus an in-memory implementation.

mod entry;
mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

pub use entry::StoredEntry;
pub use memory::MemoryStore;

// == Store Trait ==
/// Remote key-value backend used by the cache client.
///
/// Implementations own connection handling. Transport failures should be
/// reported as [`CacheError::StoreUnavailable`](crate::error::CacheError);
/// the client does not retry them.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` at `key`, replacing any previous entry and its TTL.
    /// `None` means no expiry.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()>;

    /// Removes `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Returns when `key` expires, or `None` if it has no TTL or is absent.
    async fn expiry_of(&self, key: &str) -> Result<Option<DateTime<Utc>>>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        (**self).set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }

    async fn expiry_of(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        (**self).expiry_of(key).await
    }
}
