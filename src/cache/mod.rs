//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, lazy on read and eager
//! through [`CacheEngine::delete_expired`].

mod engine;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use engine::CacheEngine;
pub use entry::{CacheEntry, Expiration};
pub use stats::CacheStats;
pub use store::{EvictionCallback, Store};
