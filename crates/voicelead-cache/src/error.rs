use std::sync::Arc;

use thiserror::Error;

/// Errors surfaced by [`crate::MemoCache::get_or_compute`].
///
/// Compute failures are wrapped in `Arc` because every waiter joined to the
/// same in-flight computation receives the same error instance.
#[derive(Debug, Error)]
pub enum CacheError<E: std::fmt::Display> {
    /// The compute closure returned an error. Not cached; the next caller
    /// for the same key will recompute.
    #[error("computation failed: {0}")]
    Compute(Arc<E>),

    /// The detached computation task aborted before completing (panic).
    #[error("computation task aborted before completing")]
    TaskFailed,
}

impl<E: std::fmt::Display> Clone for CacheError<E> {
    fn clone(&self) -> Self {
        match self {
            CacheError::Compute(e) => CacheError::Compute(Arc::clone(e)),
            CacheError::TaskFailed => CacheError::TaskFailed,
        }
    }
}
