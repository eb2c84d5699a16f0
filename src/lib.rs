//! Mini Cache - A lightweight in-process key-value cache
//!
//! Provides TTL expiration (lazy on read, eager through a background
//! janitor) and an optional eviction callback.

pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod tasks;

pub use cache::{CacheEngine, CacheEntry, CacheStats, Expiration};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use handle::Cache;
pub use tasks::{Janitor, JanitorState};
