//! Stored Entry Module
//!
//! A single value held by [`MemoryStore`](super::MemoryStore) with its expiry.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == Stored Entry ==
/// Represents a single stored value with creation and expiry timestamps.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored value
    pub value: String,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
    /// When the entry expires, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    ///
    /// A TTL too large to represent as a timestamp is treated as no expiry.
    pub fn new(value: String, ttl: Option<Duration>) -> Self {
        let now = Utc::now();
        let expires_at = ttl.and_then(|ttl| {
            chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| now.checked_add_signed(ttl))
        });

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            (expires - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }
}
