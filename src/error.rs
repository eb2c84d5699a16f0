//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Precondition failures reported by conditional inserts.
///
/// Every other cache operation is total.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `add` found a live entry for the key
    #[error("Item {0} already exists")]
    AlreadyExists(String),

    /// `replace` found no live entry for the key
    #[error("Item {0} doesn't exist")]
    NotFound(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
