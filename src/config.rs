//! Configuration Module
//!
//! Construction parameters for a [`Cache`](crate::Cache).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::Expiration;

/// Cache configuration parameters.
///
/// Everything is passed in by the caller; nothing is read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Expiration applied by `set_default` and by `Expiration::Default`
    pub default_expiration: Expiration,
    /// Janitor sweep interval; `Duration::ZERO` disables the janitor
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given default expiration and sweep interval.
    pub fn new(default_expiration: Expiration, cleanup_interval: Duration) -> Self {
        Self {
            default_expiration,
            cleanup_interval,
        }
    }

    /// Sets the default expiration policy.
    pub fn with_default_expiration(mut self, expiration: Expiration) -> Self {
        self.default_expiration = expiration;
        self
    }

    /// Sets the janitor sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Returns true if this config starts a background janitor.
    pub fn janitor_enabled(&self) -> bool {
        !self.cleanup_interval.is_zero()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_expiration: Expiration::Never,
            cleanup_interval: Duration::ZERO,
        }
    }
}
