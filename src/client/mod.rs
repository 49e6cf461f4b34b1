//! Cache Client Module
//!
//! Get-or-create, add, remove and expiry queries over a [`Store`], with
//! per-bucket rules deciding whether and how each call reaches the store.
//!
//! Raw operations on [`CacheClient`] use the literal cache key as the bucket
//! name and store strings verbatim. [`TypedCache`] handles use the value
//! type's [`Cacheable::CACHE_NAME`] as the bucket name and go through the
//! client's [`ValueCodec`].
//!
//! Every operation takes a [`CancellationToken`]. Concurrent
//! `get_or_add*` calls that miss on the same key each run their factory;
//! the store keeps whichever write lands last.

mod ops;
mod typed;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::codec::{Cacheable, JsonCodec, ValueCodec};
use crate::error::Result;
use crate::rules::{Route, RuleSet};
use crate::store::Store;

pub use typed::TypedCache;

use ops::Raw;

// == Cache Client ==
/// Caching facade over a shared store.
///
/// Cloning is cheap; clones share the store, rules and codec.
pub struct CacheClient<S, C = JsonCodec> {
    store: Arc<S>,
    rules: Arc<RuleSet>,
    codec: Arc<C>,
}

impl<S: Store> CacheClient<S> {
    // == Constructor ==
    /// Creates a client storing structured values as JSON.
    pub fn new(store: S, rules: RuleSet) -> Self {
        Self::with_codec(store, rules, JsonCodec)
    }
}

impl<S: Store, C: ValueCodec> CacheClient<S, C> {
    /// Creates a client with a custom value codec.
    pub fn with_codec(store: S, rules: RuleSet, codec: C) -> Self {
        Self {
            store: Arc::new(store),
            rules: Arc::new(rules),
            codec: Arc::new(codec),
        }
    }

    /// The rules this client was built with.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a handle for values of type `T`, bound to `T`'s bucket rule.
    pub fn typed<T: Cacheable>(&self) -> TypedCache<T, S, C> {
        TypedCache::new(
            Arc::clone(&self.store),
            Arc::clone(&self.codec),
            self.rules.resolve(T::CACHE_NAME).cloned(),
        )
    }

    fn route(&self, key: &str, expiry: Option<Duration>) -> Route {
        Route::resolve(self.rules.resolve(key), key, expiry)
    }

    // == Get Raw ==
    /// Returns the string stored for `key`.
    ///
    /// `None` covers both an absent entry and a disabled bucket.
    pub async fn get_raw(&self, key: &str, cancel: &CancellationToken) -> Result<Option<String>> {
        ops::get(&*self.store, self.route(key, None), &Raw, cancel).await
    }

    // == Add Raw ==
    /// Stores `value` for `key`. A disabled bucket drops the value.
    ///
    /// The TTL is `expiry` if given, else the bucket's configured expiry,
    /// else none.
    pub async fn add_raw(
        &self,
        key: &str,
        value: String,
        expiry: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ops::add(&*self.store, self.route(key, expiry), &value, &Raw, cancel).await
    }

    // == Get Or Add Raw ==
    /// Returns the stored string for `key`, or computes, stores and returns it.
    ///
    /// A disabled bucket always runs `factory` and never touches the store.
    /// A failed write after a successful computation is logged and the
    /// computed value is still returned.
    pub async fn get_or_add_raw<F, Fut>(
        &self,
        key: &str,
        factory: F,
        expiry: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<String>>,
    {
        ops::get_or_create(&*self.store, self.route(key, expiry), factory, &Raw, cancel).await
    }

    // == Remove ==
    /// Deletes the entry for `key`. Missing entries and disabled buckets are no-ops.
    pub async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        ops::remove(&*self.store, self.route(key, None), cancel).await
    }

    // == Expires ==
    /// Returns when the entry for `key` expires.
    ///
    /// `None` if it has no TTL, does not exist, or the bucket is disabled.
    pub async fn expires(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<DateTime<Utc>>> {
        ops::expires(&*self.store, self.route(key, None), cancel).await
    }
}

impl<S, C> Clone for CacheClient<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            rules: Arc::clone(&self.rules),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<S, C> fmt::Debug for CacheClient<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheClient")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
