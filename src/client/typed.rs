//! Typed cache handles bound to one value type's bucket.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::client::ops::{self, Coded};
use crate::codec::{Cacheable, JsonCodec, ValueCodec};
use crate::error::Result;
use crate::rules::{CacheRule, Route};
use crate::store::Store;

// == Typed Cache ==
/// Operations on values of type `T`, created by
/// [`CacheClient::typed`](crate::CacheClient::typed).
///
/// The rule for `T::CACHE_NAME` is resolved once when the handle is created.
/// Single values and lists of `T` share that rule.
pub struct TypedCache<T, S, C = JsonCodec> {
    store: Arc<S>,
    codec: Arc<C>,
    rule: Option<CacheRule>,
    _value: PhantomData<fn() -> T>,
}

impl<T, S, C> TypedCache<T, S, C>
where
    T: Cacheable,
    S: Store,
    C: ValueCodec,
{
    pub(crate) fn new(store: Arc<S>, codec: Arc<C>, rule: Option<CacheRule>) -> Self {
        Self {
            store,
            codec,
            rule,
            _value: PhantomData,
        }
    }

    /// The rule bound to this handle, `None` when defaults apply.
    pub fn rule(&self) -> Option<&CacheRule> {
        self.rule.as_ref()
    }

    fn route(&self, key: &str, expiry: Option<Duration>) -> Route {
        Route::resolve(self.rule.as_ref(), key, expiry)
    }

    // == Get ==
    /// Returns the value stored for `key`.
    ///
    /// Fails with [`CorruptEntry`](crate::CacheError::CorruptEntry) if the
    /// stored data does not decode as `T`; the entry is left in place.
    pub async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<T>> {
        ops::get(&*self.store, self.route(key, None), &Coded(&*self.codec), cancel).await
    }

    /// Returns the list stored for `key`.
    pub async fn get_list(&self, key: &str, cancel: &CancellationToken) -> Result<Option<Vec<T>>> {
        ops::get(&*self.store, self.route(key, None), &Coded(&*self.codec), cancel).await
    }

    // == Add ==
    /// Encodes and stores `value`. A disabled bucket drops the value.
    pub async fn add(
        &self,
        key: &str,
        value: &T,
        expiry: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ops::add(
            &*self.store,
            self.route(key, expiry),
            value,
            &Coded(&*self.codec),
            cancel,
        )
        .await
    }

    /// Encodes and stores a list of values under one key.
    #[allow(clippy::ptr_arg)]
    pub async fn add_list(
        &self,
        key: &str,
        values: &Vec<T>,
        expiry: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ops::add(
            &*self.store,
            self.route(key, expiry),
            values,
            &Coded(&*self.codec),
            cancel,
        )
        .await
    }

    // == Get Or Add ==
    /// Returns the stored value for `key`, or computes, stores and returns it.
    pub async fn get_or_add<F, Fut>(
        &self,
        key: &str,
        factory: F,
        expiry: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        ops::get_or_create(
            &*self.store,
            self.route(key, expiry),
            factory,
            &Coded(&*self.codec),
            cancel,
        )
        .await
    }

    /// List form of [`get_or_add`](Self::get_or_add).
    pub async fn get_or_add_list<F, Fut>(
        &self,
        key: &str,
        factory: F,
        expiry: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<T>>>,
    {
        ops::get_or_create(
            &*self.store,
            self.route(key, expiry),
            factory,
            &Coded(&*self.codec),
            cancel,
        )
        .await
    }

    // == Remove ==
    pub async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        ops::remove(&*self.store, self.route(key, None), cancel).await
    }

    // == Expires ==
    pub async fn expires(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<DateTime<Utc>>> {
        ops::expires(&*self.store, self.route(key, None), cancel).await
    }
}

impl<T, S, C> Clone for TypedCache<T, S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            rule: self.rule.clone(),
            _value: PhantomData,
        }
    }
}

impl<T, S, C> fmt::Debug for TypedCache<T, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCache")
            .field("type", &std::any::type_name::<T>())
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}
