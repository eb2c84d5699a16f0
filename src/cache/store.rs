//! Cache Store Module
//!
//! Unsynchronized key-to-entry map. Callers must hold the engine's lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::Instant;

use crate::cache::{CacheEntry, Expiration};

/// Callback fired once per entry removed by `delete` or `delete_expired`.
pub type EvictionCallback<V> = Arc<dyn Fn(&str, V) + Send + Sync>;

// == Cache Store ==
/// Raw entry storage with TTL resolution and no locking of its own.
pub struct Store<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Policy substituted for `Expiration::Default`
    default_expiration: Expiration,
    /// Optional eviction callback
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: Clone> Store<V> {
    // == Constructor ==
    /// Creates a store seeded with `entries`.
    ///
    /// A default that itself defers to the default is normalized to `Never`.
    pub fn new(default_expiration: Expiration, entries: HashMap<String, CacheEntry<V>>) -> Self {
        let default_expiration = if default_expiration.is_default() {
            Expiration::Never
        } else {
            default_expiration
        };

        Self {
            entries,
            default_expiration,
            on_evicted: None,
        }
    }

    /// Returns the normalized default expiration.
    pub fn default_expiration(&self) -> Expiration {
        self.default_expiration
    }

    // == Get ==
    /// Returns the live entry for `key`, treating expired entries as absent.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<&CacheEntry<V>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
    }

    // == Set ==
    /// Stores or overwrites `key`, resolving `expiration` against the default.
    pub fn set(&mut self, key: String, value: V, expiration: Expiration) {
        let entry = CacheEntry::new(value, expiration, self.default_expiration);
        self.entries.insert(key, entry);
    }

    // == Delete ==
    /// Removes `key` whether live or expired.
    ///
    /// Returns the removed value and whether the eviction callback should
    /// fire for it (true only when a callback is installed).
    pub fn delete(&mut self, key: &str) -> Option<(V, bool)> {
        self.entries
            .remove(key)
            .map(|entry| (entry.value, self.on_evicted.is_some()))
    }

    // == Delete Expired ==
    /// Removes every entry expired at `now`.
    ///
    /// Returns the number of entries removed and the `(key, value)` pairs
    /// the eviction callback should be invoked with.
    pub fn delete_expired(&mut self, now: Instant) -> (usize, Vec<(String, V)>) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let removed = expired.len();
        let mut evicted = Vec::new();

        for key in expired {
            if let Some((value, notify)) = self.delete(&key) {
                if notify {
                    evicted.push((key, value));
                }
            }
        }

        (removed, evicted)
    }

    // == Items ==
    /// Copies every entry still live at `now`.
    pub fn items(&self, now: Instant) -> HashMap<String, CacheEntry<V>> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // == Flush ==
    /// Drops every entry without notifying the eviction callback.
    ///
    /// Returns the number of entries discarded.
    pub fn flush(&mut self) -> usize {
        std::mem::take(&mut self.entries).len()
    }

    // == Eviction Callback ==
    /// Installs or clears the eviction callback.
    pub fn set_on_evicted(&mut self, callback: Option<EvictionCallback<V>>) {
        self.on_evicted = callback;
    }

    /// Returns a handle to the current eviction callback.
    pub fn on_evicted(&self) -> Option<EvictionCallback<V>> {
        self.on_evicted.clone()
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> std::fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.entries.len())
            .field("default_expiration", &self.default_expiration)
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> Store<String> {
        Store::new(Expiration::secs(300), HashMap::new())
    }

    fn put(store: &mut Store<String>, key: &str, value: &str, expiration: Expiration) {
        store.set(key.to_string(), value.to_string(), expiration);
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_default_normalized_to_never() {
        let store: Store<u32> = Store::new(Expiration::Default, HashMap::new());
        assert_eq!(store.default_expiration(), Expiration::Never);

        let store: Store<u32> = Store::new(Expiration::After(Duration::ZERO), HashMap::new());
        assert_eq!(store.default_expiration(), Expiration::Never);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        put(&mut store, "key1", "value1", Expiration::Default);
        let entry = store.get("key1").unwrap();

        assert_eq!(entry.value, "value1");
        assert!(entry.expires_at.is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();

        put(&mut store, "key1", "value1", Expiration::Default);
        put(&mut store, "key1", "value2", Expiration::Never);

        let entry = store.get("key1").unwrap();
        assert_eq!(entry.value, "value2");
        assert!(entry.expires_at.is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_get_ignores_expired() {
        let mut store = store();
        put(&mut store, "key1", "value1", Expiration::secs(1));

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert!(store.get("key1").is_none());
        // Still physically present until deleted or swept
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete_without_callback() {
        let mut store = store();
        put(&mut store, "key1", "value1", Expiration::Default);

        assert_eq!(store.delete("key1"), Some(("value1".to_string(), false)));
        assert!(store.is_empty());
        assert_eq!(store.delete("key1"), None);
    }

    #[test]
    fn test_store_delete_with_callback() {
        let mut store = store();
        store.set_on_evicted(Some(Arc::new(|_: &str, _: String| {})));
        put(&mut store, "key1", "value1", Expiration::Default);

        assert_eq!(store.delete("key1"), Some(("value1".to_string(), true)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_delete_expired() {
        let mut store = store();
        store.set_on_evicted(Some(Arc::new(|_: &str, _: String| {})));
        put(&mut store, "key1", "value1", Expiration::secs(1));
        put(&mut store, "key2", "value2", Expiration::secs(10));
        put(&mut store, "key3", "value3", Expiration::Never);

        tokio::time::advance(Duration::from_millis(1100)).await;

        let (removed, evicted) = store.delete_expired(Instant::now());
        assert_eq!(removed, 1);
        assert_eq!(evicted, vec![("key1".to_string(), "value1".to_string())]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_delete_expired_without_callback_collects_nothing() {
        let mut store = store();
        put(&mut store, "key1", "value1", Expiration::secs(1));

        tokio::time::advance(Duration::from_secs(2)).await;

        let (removed, evicted) = store.delete_expired(Instant::now());
        assert_eq!(removed, 1);
        assert!(evicted.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_items_skips_expired() {
        let mut store = store();
        put(&mut store, "short", "a", Expiration::secs(1));
        put(&mut store, "long", "b", Expiration::secs(60));

        tokio::time::advance(Duration::from_secs(2)).await;

        let items = store.items(Instant::now());
        assert_eq!(items.len(), 1);
        assert_eq!(items["long"].value, "b");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_flush() {
        let mut store = store();
        put(&mut store, "key1", "value1", Expiration::Default);
        put(&mut store, "key2", "value2", Expiration::Default);

        assert_eq!(store.flush(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_seeded_entries() {
        let mut seed = HashMap::new();
        seed.insert("seeded".to_string(), CacheEntry::persistent("v".to_string()));

        let store = Store::new(Expiration::Never, seed);
        assert_eq!(store.get("seeded").unwrap().value, "v");
    }
}
