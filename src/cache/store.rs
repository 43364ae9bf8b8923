//! Cache Store Module
//!
//! The bounded LRU store: composes the recency list and its lookup index
//! with a fixed capacity and the single-flight load coordinator.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, FlightGroup, RecencyList};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::loader::Loader;

// == Store Inner ==
/// State guarded by the store's lock. Held only for O(1) operations; never
/// across a backing-store load.
#[derive(Debug)]
struct StoreInner {
    /// Recency-ordered entries plus key lookup index
    list: RecencyList,
    /// Performance statistics
    stats: CacheStats,
}

// == Key Store Cache ==
/// A bounded LRU cache over a backing [`Loader`].
///
/// `get` is the sole read/mutate path: a hit promotes the entry and returns
/// from memory; a miss performs (or joins) the single in-flight load for the
/// key, then populates the cache, evicting the least recently used entry if
/// at capacity. All methods take `&self`; the cache is safe to share across
/// tasks behind an `Arc`.
///
/// The store's lock and the coordinator's lock are never held by one task at
/// the same time, and neither is ever held while the loader runs.
pub struct KeyStoreCache {
    /// List + index + stats, behind the store's exclusive lock
    inner: Mutex<StoreInner>,
    /// Single-flight coordinator for misses
    flights: FlightGroup,
    /// The backing store
    loader: Arc<dyn Loader>,
    /// Maximum number of resident entries, fixed for the cache's lifetime
    capacity: usize,
}

impl KeyStoreCache {
    // == Constructor ==
    /// Creates a new cache with the given capacity and backing loader.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize, loader: Arc<dyn Loader>) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            inner: Mutex::new(StoreInner {
                list: RecencyList::with_capacity(capacity),
                stats: CacheStats::new(),
            }),
            flights: FlightGroup::new(),
            loader,
            capacity,
        })
    }

    /// Creates a new cache from configuration.
    pub fn from_config(config: &Config, loader: Arc<dyn Loader>) -> Result<Self> {
        Self::new(config.capacity, loader)
    }

    // == Get ==
    /// Retrieves the value for `key`, loading it from the backing store on a
    /// miss.
    ///
    /// A hit is served entirely from memory and promotes the entry to most
    /// recently used. A miss releases the store's lock before loading, so a
    /// slow backing store never blocks hits or other keys' misses; concurrent
    /// misses on the same key share one load.
    ///
    /// # Errors
    /// Returns [`CacheError::LoadFailed`] if the backing store cannot
    /// produce the value. Failures are never cached; the next call retries.
    pub async fn get(&self, key: &str) -> Result<String> {
        {
            let mut inner = self.inner.lock().await;
            if let Some(value) = inner.list.peek_value(key).map(str::to_string) {
                inner.list.promote(key);
                inner.stats.record_hit();
                return Ok(value);
            }
            inner.stats.record_miss();
        }

        // Lock released: delegate to the coordinator for the actual load.
        let value = self.flights.load(key, self.loader.as_ref()).await?;

        let mut inner = self.inner.lock().await;

        // Another task may have inserted this key while we were loading,
        // either from the same flight or an independent one that raced in.
        // Return the resident value as-is; its recency already reflects the
        // winner's insert.
        if let Some(existing) = inner.list.peek_value(key) {
            return Ok(existing.to_string());
        }

        if inner.list.len() >= self.capacity {
            if let Some(evicted) = inner.list.evict_back() {
                inner.stats.record_eviction();
                debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        inner.list.insert_front(key.to_string(), value.clone());
        let resident = inner.list.len();
        inner.stats.set_total_entries(resident);
        debug!(key, total_entries = resident, "inserted loaded entry");

        Ok(value)
    }

    // == Contains ==
    /// Checks residency without touching recency order or the loader.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.list.contains(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.list.len());
        stats
    }

    // == Length ==
    /// Returns the current number of resident entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.list.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are resident.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.list.is_empty()
    }

    // == Capacity ==
    /// Returns the fixed capacity this cache was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Counts loads per key; fails for keys it was told to fail.
    struct TestLoader {
        calls: StdMutex<HashMap<String, usize>>,
        total: AtomicUsize,
        fail_keys: Vec<String>,
    }

    impl TestLoader {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: StdMutex::new(HashMap::new()),
                total: AtomicUsize::new(0),
                fail_keys: Vec::new(),
            })
        }

        fn failing_on(keys: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                calls: StdMutex::new(HashMap::new()),
                total: AtomicUsize::new(0),
                fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            })
        }

        fn calls_for(&self, key: &str) -> usize {
            self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Loader for TestLoader {
        async fn load(&self, key: &str) -> Result<String> {
            *self.calls.lock().unwrap().entry(key.to_string()).or_insert(0) += 1;
            self.total.fetch_add(1, Ordering::SeqCst);

            if self.fail_keys.iter().any(|k| k == key) {
                return Err(CacheError::load_failed(key, "backing store down"));
            }
            Ok(format!("value_{key}"))
        }
    }

    fn cache_with(capacity: usize, loader: Arc<TestLoader>) -> KeyStoreCache {
        KeyStoreCache::new(capacity, loader).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_capacity() {
        let result = KeyStoreCache::new(0, TestLoader::new());
        assert!(matches!(result, Err(CacheError::InvalidCapacity(0))));
    }

    #[test]
    fn test_from_config() {
        let config = Config { capacity: 7 };
        let cache = KeyStoreCache::from_config(&config, TestLoader::new()).unwrap();
        assert_eq!(cache.capacity(), 7);
    }

    #[tokio::test]
    async fn test_miss_loads_once_then_hits() {
        let loader = TestLoader::new();
        let cache = cache_with(10, Arc::clone(&loader));

        assert_eq!(cache.get("key1").await.unwrap(), "value_key1");
        assert_eq!(cache.get("key1").await.unwrap(), "value_key1");
        assert_eq!(cache.get("key1").await.unwrap(), "value_key1");

        // Only the first get went to the backing store
        assert_eq!(loader.calls_for("key1"), 1);
    }

    #[tokio::test]
    async fn test_eviction_of_oldest_key() {
        // Capacity 2: A, B, C leaves {B, C} resident
        let loader = TestLoader::new();
        let cache = cache_with(2, Arc::clone(&loader));

        cache.get("A").await.unwrap();
        cache.get("B").await.unwrap();
        cache.get("C").await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(!cache.contains("A").await);
        assert!(cache.contains("B").await);
        assert!(cache.contains("C").await);
    }

    #[tokio::test]
    async fn test_hit_refreshes_recency() {
        // Capacity 2: A, B, hit A, C evicts B and leaves {A, C}
        let loader = TestLoader::new();
        let cache = cache_with(2, Arc::clone(&loader));

        cache.get("A").await.unwrap();
        cache.get("B").await.unwrap();
        cache.get("A").await.unwrap();
        cache.get("C").await.unwrap();

        assert!(cache.contains("A").await);
        assert!(!cache.contains("B").await);
        assert!(cache.contains("C").await);
        // A was served from memory the second time
        assert_eq!(loader.calls_for("A"), 1);
    }

    #[tokio::test]
    async fn test_hit_does_not_change_value() {
        let loader = TestLoader::new();
        let cache = cache_with(2, Arc::clone(&loader));

        let first = cache.get("key1").await.unwrap();
        let second = cache.get("key1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_evicted_key_reloads() {
        let loader = TestLoader::new();
        let cache = cache_with(2, Arc::clone(&loader));

        cache.get("A").await.unwrap();
        cache.get("B").await.unwrap();
        cache.get("C").await.unwrap(); // evicts A
        cache.get("A").await.unwrap(); // fresh load

        assert_eq!(loader.calls_for("A"), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let loader = TestLoader::failing_on(&["bad"]);
        let cache = cache_with(10, Arc::clone(&loader));

        let result = cache.get("bad").await;
        assert!(matches!(result, Err(CacheError::LoadFailed { .. })));
        assert!(!cache.contains("bad").await);
        assert!(cache.is_empty().await);

        // A later get retries the load independently
        let _ = cache.get("bad").await;
        assert_eq!(loader.calls_for("bad"), 2);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_other_entries_alone() {
        let loader = TestLoader::failing_on(&["bad"]);
        let cache = cache_with(10, Arc::clone(&loader));

        cache.get("good").await.unwrap();
        let _ = cache.get("bad").await;

        assert!(cache.contains("good").await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_stats_accuracy() {
        let loader = TestLoader::new();
        let cache = cache_with(2, Arc::clone(&loader));

        cache.get("A").await.unwrap(); // miss
        cache.get("A").await.unwrap(); // hit
        cache.get("B").await.unwrap(); // miss
        cache.get("C").await.unwrap(); // miss + eviction

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 2);
        assert_eq!(loader.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_capacity_one() {
        let loader = TestLoader::new();
        let cache = cache_with(1, Arc::clone(&loader));

        cache.get("A").await.unwrap();
        cache.get("B").await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.contains("B").await);
        assert!(!cache.contains("A").await);
    }
}
