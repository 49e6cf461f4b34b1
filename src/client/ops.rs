//! Shared operation flow for raw and typed clients.
//!
//! Each function takes an already resolved [`Route`], so the disabled-bucket
//! short-circuit happens in exactly one place per operation.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::codec::ValueCodec;
use crate::error::{CacheError, Result};
use crate::rules::Route;
use crate::store::Store;

// == Shapes ==
/// How a value of type `T` is represented in the store.
pub(crate) trait Shape<T> {
    fn encode(&self, key: &str, value: &T) -> Result<String>;

    fn decode(&self, key: &str, payload: String) -> Result<T>;
}

/// Strings stored verbatim.
pub(crate) struct Raw;

impl Shape<String> for Raw {
    fn encode(&self, _key: &str, value: &String) -> Result<String> {
        Ok(value.clone())
    }

    fn decode(&self, _key: &str, payload: String) -> Result<String> {
        Ok(payload)
    }
}

/// Structured values passed through a [`ValueCodec`].
pub(crate) struct Coded<'a, C>(pub(crate) &'a C);

impl<T, C> Shape<T> for Coded<'_, C>
where
    T: Serialize + DeserializeOwned,
    C: ValueCodec,
{
    fn encode(&self, key: &str, value: &T) -> Result<String> {
        self.0
            .encode(value)
            .map_err(|source| CacheError::Serialization {
                key: key.to_string(),
                source: Box::new(source),
            })
    }

    fn decode(&self, key: &str, payload: String) -> Result<T> {
        self.0
            .decode(&payload)
            .map_err(|source| CacheError::CorruptEntry {
                key: key.to_string(),
                source: Box::new(source),
            })
    }
}

// == Cancellation ==
/// Runs `fut` unless `cancel` fires first. An already cancelled token wins
/// without polling `fut`.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CacheError::Cancelled),
        result = fut => result,
    }
}

async fn run_factory<T, F, Fut>(factory: F, cancel: &CancellationToken) -> Result<T>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let computation = factory(cancel.clone());
    cancellable(cancel, async move {
        computation.await.map_err(CacheError::FactoryFailure)
    })
    .await
}

async fn read<S, T, V>(store: &S, key: &str, shape: &V, cancel: &CancellationToken) -> Result<Option<T>>
where
    S: Store + ?Sized,
    V: Shape<T>,
{
    match cancellable(cancel, store.get(key)).await? {
        Some(payload) => {
            debug!(key = %key, "cache hit");
            shape.decode(key, payload).map(Some)
        }
        None => {
            debug!(key = %key, "cache miss");
            Ok(None)
        }
    }
}

// == Get ==
pub(crate) async fn get<S, T, V>(
    store: &S,
    route: Route,
    shape: &V,
    cancel: &CancellationToken,
) -> Result<Option<T>>
where
    S: Store + ?Sized,
    V: Shape<T>,
{
    match route {
        Route::Bypass => Ok(None),
        Route::Store { key, .. } => read(store, &key, shape, cancel).await,
    }
}

// == Add ==
pub(crate) async fn add<S, T, V>(
    store: &S,
    route: Route,
    value: &T,
    shape: &V,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: Store + ?Sized,
    V: Shape<T>,
{
    match route {
        Route::Bypass => {
            debug!("cache disabled, dropping value");
            Ok(())
        }
        Route::Store { key, ttl } => {
            let payload = shape.encode(&key, value)?;
            cancellable(cancel, store.set(&key, payload, ttl)).await
        }
    }
}

// == Get Or Create ==
/// Check-then-fill with no coordination between concurrent callers: on a
/// shared miss every caller runs its factory and the last write wins.
pub(crate) async fn get_or_create<S, T, V, F, Fut>(
    store: &S,
    route: Route,
    factory: F,
    shape: &V,
    cancel: &CancellationToken,
) -> Result<T>
where
    S: Store + ?Sized,
    V: Shape<T>,
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let (key, ttl) = match route {
        Route::Bypass => {
            debug!("cache disabled, computing value directly");
            return run_factory(factory, cancel).await;
        }
        Route::Store { key, ttl } => (key, ttl),
    };

    if let Some(value) = read(store, &key, shape, cancel).await? {
        return Ok(value);
    }

    let value = run_factory(factory, cancel).await?;
    fill(store, &key, &value, ttl, shape, cancel).await?;
    Ok(value)
}

/// Writes a freshly computed value. Only cancellation is returned; other
/// failures are logged so the computed value still reaches the caller.
async fn fill<S, T, V>(
    store: &S,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
    shape: &V,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: Store + ?Sized,
    V: Shape<T>,
{
    let payload = match shape.encode(key, value) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(key = %key, error = %err, "skipping cache fill");
            return Ok(());
        }
    };

    match cancellable(cancel, store.set(key, payload, ttl)).await {
        Ok(()) => {
            debug!(key = %key, ttl = ?ttl, "cache filled");
            Ok(())
        }
        Err(CacheError::Cancelled) => Err(CacheError::Cancelled),
        Err(err) => {
            warn!(key = %key, error = %err, "cache fill failed, returning computed value");
            Ok(())
        }
    }
}

// == Remove ==
pub(crate) async fn remove<S>(store: &S, route: Route, cancel: &CancellationToken) -> Result<()>
where
    S: Store + ?Sized,
{
    match route {
        Route::Bypass => Ok(()),
        Route::Store { key, .. } => cancellable(cancel, store.delete(&key)).await,
    }
}

// == Expires ==
pub(crate) async fn expires<S>(
    store: &S,
    route: Route,
    cancel: &CancellationToken,
) -> Result<Option<DateTime<Utc>>>
where
    S: Store + ?Sized,
{
    match route {
        Route::Bypass => Ok(None),
        Route::Store { key, .. } => cancellable(cancel, store.expiry_of(&key)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::store::MemoryStore;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_cancellable_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = cancellable(&cancel, async { Ok(1) }).await;
        assert!(matches!(result, Err(CacheError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancellable_passes_result_through() {
        let cancel = CancellationToken::new();
        let value = assert_ok!(cancellable(&cancel, async { Ok(5) }).await);
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_factory_error_is_wrapped_unchanged() {
        let cancel = CancellationToken::new();
        let err = run_factory(
            |_| async { Err::<u32, _>(anyhow::anyhow!("upstream timeout")) },
            &cancel,
        )
        .await
        .unwrap_err();

        match err {
            CacheError::FactoryFailure(inner) => assert_eq!(inner.to_string(), "upstream timeout"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_coded_decode_failure_is_corrupt_entry() {
        let codec = JsonCodec;
        let shape = Coded(&codec);
        let err = Shape::<Vec<u32>>::decode(&shape, "k", "oops".to_string()).unwrap_err();
        assert!(matches!(err, CacheError::CorruptEntry { ref key, .. } if key == "k"));
    }

    #[tokio::test]
    async fn test_bypass_never_touches_store() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();

        assert_ok!(add(&store, Route::Bypass, &"v".to_string(), &Raw, &cancel).await);
        assert!(store.is_empty().await);
        assert!(get::<_, String, _>(&store, Route::Bypass, &Raw, &cancel)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_fills_store() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        let route = Route::Store {
            key: "k".to_string(),
            ttl: None,
        };

        let value = get_or_create(
            &store,
            route,
            |_| async { Ok("computed".to_string()) },
            &Raw,
            &cancel,
        )
        .await
        .unwrap();

        assert_eq!(value, "computed");
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("computed"));
    }

    #[tokio::test]
    async fn test_get_or_create_cancelled_before_start() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let route = Route::Store {
            key: "k".to_string(),
            ttl: None,
        };
        let result = get_or_create(
            &store,
            route,
            |_| async { Ok("computed".to_string()) },
            &Raw,
            &cancel,
        )
        .await;

        assert!(matches!(result, Err(CacheError::Cancelled)));
        assert!(store.is_empty().await);
    }
}
