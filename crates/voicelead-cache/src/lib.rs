//! Read-through memoization cache with single-flight computation.
//!
//! [`MemoCache::get_or_compute`] memoizes expensive lookups by canonical key
//! with a per-entry TTL. Concurrent callers for the same key share one
//! in-flight computation instead of each invoking the compute closure; the
//! computation runs on a detached task, so a waiter that disconnects does
//! not cancel it for the remaining waiters.
//!
//! Key schemes are deliberately NOT part of this crate: callers canonicalize
//! their own fingerprints (normalized address, quote-request digest) so each
//! canonicalization stays unit-testable without the cache mechanism.

mod cache;
mod error;

pub use cache::{Lookup, MemoCache};
pub use error::CacheError;
