//! Cache Module
//!
//! Provides the bounded LRU store and its internals: the recency list with
//! its lookup index, the single-flight load coordinator, and statistics.

mod entry;
mod flight;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use flight::FlightGroup;
pub use lru::RecencyList;
pub use stats::CacheStats;
pub use store::KeyStoreCache;
