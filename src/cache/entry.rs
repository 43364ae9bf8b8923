//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

// == Cache Entry ==
/// Represents a single cached key-value pair.
///
/// Both fields are immutable once created: a reload produces a new entry
/// rather than mutating one in place. The key is carried alongside the value
/// so that evicting an entry can also unregister it from the lookup index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The cached key
    key: String,
    /// The cached value
    value: String,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(key: String, value: String) -> Self {
        Self { key, value }
    }

    // == Key ==
    /// Returns the entry's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    // == Value ==
    /// Returns the entry's value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the entry, returning its key.
    pub fn into_key(self) -> String {
        self.key
    }
}
