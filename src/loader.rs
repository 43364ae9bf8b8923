//! Loader Module
//!
//! The seam between the cache and its backing store.

use async_trait::async_trait;

use crate::error::Result;

// == Loader Trait ==
/// A source of values for cache misses.
///
/// Implemented by the caller (a database client, typically) and consumed by
/// the cache: every miss resolves to exactly one `load` call per in-flight
/// key, however many callers are waiting on it.
///
/// A failed load is surfaced to every waiting caller and is never cached;
/// the next `get` for that key issues a fresh, independent load.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Produces the value for `key`, or a [`CacheError::LoadFailed`] if the
    /// backing store cannot.
    ///
    /// [`CacheError::LoadFailed`]: crate::error::CacheError::LoadFailed
    async fn load(&self, key: &str) -> Result<String>;
}
