//! Cache Entry Module
//!
//! Defines individual cache entries and the expiration policy used to build them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// == Expiration ==
/// Expiration policy requested when storing an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiration {
    /// Use the cache's configured default
    #[default]
    Default,
    /// The entry never expires
    Never,
    /// The entry expires once this much time has passed
    After(Duration),
}

impl Expiration {
    /// Shorthand for `Expiration::After(Duration::from_secs(secs))`.
    pub fn secs(secs: u64) -> Self {
        Expiration::After(Duration::from_secs(secs))
    }

    /// Returns true if this policy defers to the cache default.
    ///
    /// A zero duration counts as the default.
    pub fn is_default(&self) -> bool {
        match self {
            Expiration::Default => true,
            Expiration::After(ttl) => ttl.is_zero(),
            Expiration::Never => false,
        }
    }

    /// Computes the absolute deadline for an entry stored at `now`.
    ///
    /// `default` is consulted only when `self` defers to it; a default that
    /// itself defers resolves to no deadline.
    pub fn deadline(self, default: Expiration, now: Instant) -> Option<Instant> {
        let resolved = if self.is_default() { default } else { self };
        match resolved {
            Expiration::After(ttl) if !ttl.is_zero() => now.checked_add(ttl),
            _ => None,
        }
    }
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        Expiration::After(ttl)
    }
}

// == Cache Entry ==
/// A stored value with its absolute expiration instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry expiring according to `expiration`, resolving
    /// `Expiration::Default` against `default`.
    pub fn new(value: V, expiration: Expiration, default: Expiration) -> Self {
        Self {
            value,
            expires_at: expiration.deadline(default, Instant::now()),
        }
    }

    /// Creates an entry that never expires.
    pub fn persistent(value: V) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry had expired at `now`.
    ///
    /// An entry is expired only once `now` is strictly past its deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Checks if the entry has expired as of the current instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the deadline has passed.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
