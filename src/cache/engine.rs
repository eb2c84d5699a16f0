//! Cache Engine Module
//!
//! Wraps the raw store in a reader/writer lock and implements the public
//! cache operations. Eviction callbacks always run after the lock is released.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, Expiration, Store};
use crate::error::{CacheError, Result};

// == Cache Engine ==
/// Thread-safe TTL cache over values of type `V`.
///
/// Lookups take the read lock, mutations take the write lock. Expired
/// entries read as absent but stay stored until deleted or swept, so
/// [`item_count`](Self::item_count) may include them.
pub struct CacheEngine<V> {
    store: RwLock<Store<V>>,
    stats: StatsCounters,
}

impl<V> CacheEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty engine.
    pub fn new(default_expiration: Expiration) -> Self {
        Self::with_items(default_expiration, HashMap::new())
    }

    /// Creates an engine seeded with `items`.
    ///
    /// Seeded entries keep their own deadlines, expired ones included.
    pub fn with_items(
        default_expiration: Expiration,
        items: HashMap<String, CacheEntry<V>>,
    ) -> Self {
        Self {
            store: RwLock::new(Store::new(default_expiration, items)),
            stats: StatsCounters::default(),
        }
    }

    /// Returns the default expiration applied by `set_default`.
    pub fn default_expiration(&self) -> Expiration {
        self.store.read().default_expiration()
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// Overwriting is not an eviction; the callback does not fire.
    pub fn set(&self, key: impl Into<String>, value: V, expiration: Expiration) {
        self.store.write().set(key.into(), value, expiration);
    }

    /// Stores `value` under `key` with the default expiration.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, Expiration::Default);
    }

    // == Add ==
    /// Stores `value` only if `key` has no live entry.
    ///
    /// An expired entry still occupying `key` is overwritten.
    pub fn add(&self, key: impl Into<String>, value: V, expiration: Expiration) -> Result<()> {
        let key = key.into();
        let mut store = self.store.write();
        if store.get(&key).is_some() {
            return Err(CacheError::AlreadyExists(key));
        }
        store.set(key, value, expiration);
        Ok(())
    }

    // == Replace ==
    /// Stores `value` only if `key` already has a live entry.
    pub fn replace(
        &self,
        key: impl Into<String>,
        value: V,
        expiration: Expiration,
    ) -> Result<()> {
        let key = key.into();
        let mut store = self.store.write();
        if store.get(&key).is_none() {
            return Err(CacheError::NotFound(key));
        }
        store.set(key, value, expiration);
        Ok(())
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.store.read().get(key).map(|entry| entry.value.clone());
        self.stats.record_lookup(value.is_some());
        value
    }

    /// Returns the live value for `key` together with its expiration
    /// instant (`None` if it never expires).
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Option<Instant>)> {
        let found = self
            .store
            .read()
            .get(key)
            .map(|entry| (entry.value.clone(), entry.expires_at));
        self.stats.record_lookup(found.is_some());
        found
    }

    // == Delete ==
    /// Removes `key` whether live or expired, notifying the eviction
    /// callback if one is installed and the key existed.
    pub fn delete(&self, key: &str) {
        let (removed, callback) = {
            let mut store = self.store.write();
            (store.delete(key), store.on_evicted())
        };

        let Some((value, notify)) = removed else {
            return;
        };
        self.stats.record_evictions(1);

        if let (true, Some(callback)) = (notify, callback) {
            callback(key, value);
        }
    }

    // == Delete Expired ==
    /// Removes every entry expired as of now and notifies the eviction
    /// callback once per removed entry.
    ///
    /// Returns the number of entries removed.
    pub fn delete_expired(&self) -> usize {
        let now = Instant::now();
        let ((removed, evicted), callback) = {
            let mut store = self.store.write();
            (store.delete_expired(now), store.on_evicted())
        };

        self.stats.record_evictions(removed);
        if removed > 0 {
            debug!(removed, "Deleted expired entries");
        }

        if let Some(callback) = callback {
            for (key, value) in evicted {
                callback(&key, value);
            }
        }

        removed
    }

    // == On Evicted ==
    /// Installs the eviction callback, replacing any previous one.
    ///
    /// The callback runs outside the cache lock and may call back into
    /// the cache.
    pub fn on_evicted<F>(&self, callback: F)
    where
        F: Fn(&str, V) + Send + Sync + 'static,
    {
        self.store.write().set_on_evicted(Some(Arc::new(callback)));
    }

    /// Removes the eviction callback.
    pub fn clear_on_evicted(&self) {
        self.store.write().set_on_evicted(None);
    }

    // == Items ==
    /// Returns a snapshot of every live entry.
    pub fn items(&self) -> HashMap<String, CacheEntry<V>> {
        let now = Instant::now();
        self.store.read().items(now)
    }

    // == Item Count ==
    /// Returns the number of stored entries, including expired entries
    /// not yet swept.
    pub fn item_count(&self) -> usize {
        self.store.read().len()
    }

    // == Flush ==
    /// Discards every entry. The eviction callback is not invoked.
    pub fn flush(&self) {
        let discarded = self.store.write().flush();
        debug!(discarded, "Flushed cache");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.item_count())
    }
}

impl<V> std::fmt::Debug for CacheEngine<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEngine")
            .field("store", &*self.store.read())
            .finish()
    }
}
