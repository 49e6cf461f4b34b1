//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - TTL Cleanup: Purges expired entries from a [`MemoryStore`](crate::store::MemoryStore)

mod cleanup;

pub use cleanup::spawn_cleanup_task;
