//! Cache Facade - A typed get-or-create caching layer
//!
//! Sits in front of a remote key-value store. Per-bucket rules, keyed by a
//! literal cache key or a value type's cache name, decide whether a call
//! reaches the store, which store key it uses and its default expiry.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod rules;
pub mod store;
pub mod tasks;


pub use client::{CacheClient, TypedCache};
pub use codec::{Cacheable, JsonCodec, ValueCodec};
pub use config::Config;
pub use error::{CacheError, Result};
pub use rules::{CacheRule, RuleSet};
pub use store::{MemoryStore, Store};
pub use tasks::spawn_cleanup_task;

// Re-exported so callers need not depend on tokio-util directly.
pub use tokio_util::sync::CancellationToken;
