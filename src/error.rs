//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Cloneable so that a single load outcome can be delivered to every caller
/// waiting on the same in-flight load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The backing store could not produce a value for the key
    #[error("Load failed for key '{key}': {reason}")]
    LoadFailed {
        /// Key whose load failed
        key: String,
        /// Description of the underlying failure
        reason: String,
    },

    /// The cache was constructed with a non-positive capacity
    #[error("Invalid capacity {0}: capacity must be greater than zero")]
    InvalidCapacity(usize),
}

impl CacheError {
    /// Builds a [`CacheError::LoadFailed`] for the given key.
    pub fn load_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failed_display() {
        let err = CacheError::load_failed("user:42", "backing store unavailable");
        assert_eq!(
            err.to_string(),
            "Load failed for key 'user:42': backing store unavailable"
        );
    }

    #[test]
    fn test_invalid_capacity_display() {
        let err = CacheError::InvalidCapacity(0);
        assert!(err.to_string().contains("capacity must be greater than zero"));
    }

    #[test]
    fn test_error_is_cloneable() {
        let err = CacheError::load_failed("k", "boom");
        assert_eq!(err.clone(), err);
    }
}
