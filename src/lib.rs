//! Keystore Cache - a bounded in-memory LRU cache
//!
//! Sits in front of a slower key/value source (a database, typically) and
//! serves repeated reads from memory. Capacity is fixed at construction; the
//! least recently used entry is evicted when a new key arrives at capacity.
//! Concurrent misses on the same key are collapsed into a single
//! backing-store load, whose outcome fans out to every waiting caller.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//!
//! use keystore_cache::{async_trait, KeyStoreCache, Loader, Result};
//!
//! struct Upcase;
//!
//! #[async_trait]
//! impl Loader for Upcase {
//!     async fn load(&self, key: &str) -> Result<String> {
//!         Ok(key.to_uppercase())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let cache = KeyStoreCache::new(2, Arc::new(Upcase)).unwrap();
//! assert_eq!(cache.get("hello").await.unwrap(), "HELLO");
//! # });
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;

pub use cache::{CacheStats, KeyStoreCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use loader::Loader;

// Re-exported so implementors of `Loader` don't need their own dependency.
pub use async_trait::async_trait;
