//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 100)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}
