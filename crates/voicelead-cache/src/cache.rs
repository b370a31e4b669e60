use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::error::CacheError;

/// A cache lookup outcome: the value plus whether it was served from cache.
///
/// `was_cached` is `true` both for entries served from a stored value and
/// for callers that joined an in-flight computation started by someone else.
#[derive(Debug, Clone)]
pub struct Lookup<V> {
    pub value: V,
    pub was_cached: bool,
}

type SharedComputation<V, E> = Shared<BoxFuture<'static, Result<V, CacheError<E>>>>;

enum Slot<V, E: std::fmt::Display> {
    Ready { value: V, expires_at: Instant },
    Pending(SharedComputation<V, E>),
}

/// Keyed TTL memo cache with at-most-one concurrent computation per key.
///
/// The map mutex is only held for slot bookkeeping, never across a compute
/// await, so distinct keys proceed fully independently. The computation for
/// a missed key runs on a detached task: waiters share its result through a
/// [`Shared`] future, and one waiter disconnecting leaves the computation
/// running for the rest.
pub struct MemoCache<V, E: std::fmt::Display> {
    inner: Arc<Mutex<HashMap<String, Slot<V, E>>>>,
}

impl<V, E: std::fmt::Display> Clone for MemoCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, E: std::fmt::Display> Default for MemoCache<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E: std::fmt::Display> MemoCache<V, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V, E> MemoCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: std::fmt::Display + Send + Sync + 'static,
{
    /// Return the cached value for `key`, or run `compute` to produce it.
    ///
    /// Fresh entries are returned immediately. A key with an in-flight
    /// computation joins it rather than computing again. Otherwise `compute`
    /// is invoked exactly once, its successful result stored with `ttl`, and
    /// all current waiters receive the same outcome. Failed computations are
    /// not cached.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Compute`] if `compute` fails, shared by every
    /// waiter joined to the same computation, or [`CacheError::TaskFailed`]
    /// if the computation task panicked.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<Lookup<V>, CacheError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let shared = {
            let mut map = self.inner.lock().await;

            match map.get(key) {
                Some(Slot::Ready { value, expires_at }) if *expires_at > Instant::now() => {
                    return Ok(Lookup {
                        value: value.clone(),
                        was_cached: true,
                    });
                }
                Some(Slot::Pending(shared)) => {
                    let shared = shared.clone();
                    drop(map);
                    let value = shared.await?;
                    return Ok(Lookup {
                        value,
                        was_cached: true,
                    });
                }
                _ => {}
            }

            let now = Instant::now();
            map.retain(|_, slot| match slot {
                Slot::Ready { expires_at, .. } => *expires_at > now,
                Slot::Pending(_) => true,
            });

            // The task is spawned while the map lock is held: its write-back
            // blocks on the same lock, so the Pending slot is always in place
            // before the task replaces it with Ready (or removes it on error).
            let fut = compute();
            let inner = Arc::clone(&self.inner);
            let owned_key = key.to_string();
            let handle = tokio::spawn(async move {
                let result = fut.await;
                let mut map = inner.lock().await;
                match result {
                    Ok(value) => {
                        map.insert(
                            owned_key,
                            Slot::Ready {
                                value: value.clone(),
                                expires_at: Instant::now() + ttl,
                            },
                        );
                        Ok(value)
                    }
                    Err(e) => {
                        map.remove(&owned_key);
                        Err(CacheError::Compute(Arc::new(e)))
                    }
                }
            });

            let shared: SharedComputation<V, E> = handle
                .map(|join| match join {
                    Ok(result) => result,
                    Err(join_err) => {
                        tracing::error!(error = %join_err, "cache computation task failed");
                        Err(CacheError::TaskFailed)
                    }
                })
                .boxed()
                .shared();

            map.insert(key.to_string(), Slot::Pending(shared.clone()));
            shared
        };

        let value = shared.await?;
        Ok(Lookup {
            value,
            was_cached: false,
        })
    }
}
