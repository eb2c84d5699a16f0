//! Cache Handle
//!
//! The externally held cache object. Owns the engine and, when a cleanup
//! interval is configured, the janitor sweeping it.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEngine, CacheEntry, Expiration};
use crate::config::CacheConfig;
use crate::tasks::{Janitor, JanitorState};

// == Cache ==
/// In-process TTL cache.
///
/// All cache operations are reached through [`Deref`] to [`CacheEngine`].
/// Call [`close`](Self::close) to stop the janitor and wait for it; dropping
/// the handle signals the janitor to stop without waiting.
///
/// # Example
///
/// ```rust,no_run
/// use mini_cache::{Cache, Expiration};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let mut cache = Cache::new(Expiration::secs(60), Duration::from_secs(120));
///     cache.set("k", 123, Expiration::Default);
///     assert_eq!(cache.get("k"), Some(123));
///     cache.close().await;
/// }
/// ```
#[derive(Debug)]
pub struct Cache<V> {
    engine: Arc<CacheEngine<V>>,
    janitor: Option<Janitor>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the given default expiration. A zero
    /// `cleanup_interval` disables the janitor.
    ///
    /// # Panics
    ///
    /// Panics if a janitor is requested outside of a Tokio runtime context.
    pub fn new(default_expiration: Expiration, cleanup_interval: Duration) -> Self {
        Self::with_config(CacheConfig::new(default_expiration, cleanup_interval))
    }

    /// Creates a cache from a [`CacheConfig`].
    ///
    /// # Panics
    ///
    /// Panics if a janitor is requested outside of a Tokio runtime context.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::new_from(config, HashMap::new())
    }

    /// Creates a cache seeded with `items`, e.g. a snapshot taken with
    /// [`CacheEngine::items`].
    ///
    /// # Panics
    ///
    /// Panics if a janitor is requested outside of a Tokio runtime context.
    pub fn new_from(config: CacheConfig, items: HashMap<String, CacheEntry<V>>) -> Self {
        let engine = Arc::new(CacheEngine::with_items(config.default_expiration, items));

        let janitor = config
            .janitor_enabled()
            .then(|| Janitor::spawn(Arc::downgrade(&engine), config.cleanup_interval));

        debug!(
            default_expiration = ?engine.default_expiration(),
            janitor = janitor.is_some(),
            "Cache created"
        );

        Self { engine, janitor }
    }

    /// Returns a shared reference to the underlying engine.
    pub fn engine(&self) -> &Arc<CacheEngine<V>> {
        &self.engine
    }

    /// Returns the janitor's state; `Stopped` when none was configured.
    pub fn janitor_state(&self) -> JanitorState {
        self.janitor
            .as_ref()
            .map_or(JanitorState::Stopped, Janitor::state)
    }

    // == Close ==
    /// Stops the janitor, if any, and waits for it to exit.
    ///
    /// Safe to call more than once. The cache stays usable afterwards
    /// with lazy expiration only.
    pub async fn close(&mut self) {
        if let Some(mut janitor) = self.janitor.take() {
            janitor.shutdown().await;
        }
    }
}

impl<V> Deref for Cache<V> {
    type Target = CacheEngine<V>;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_cache_without_janitor_needs_no_runtime() {
        let cache = Cache::new(Expiration::secs(60), Duration::ZERO);
        assert_eq!(cache.janitor_state(), JanitorState::Stopped);

        cache.set("k", 1u8, Expiration::Default);
        assert_eq!(cache.get("k"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_with_janitor_sweeps() {
        let mut cache = Cache::new(Expiration::secs(60), Duration::from_secs(10));
        assert_eq!(cache.janitor_state(), JanitorState::Running);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cache.on_evicted(move |key, value| sink.lock().push((key.to_string(), value)));

        cache.set("k", "v", Expiration::secs(1));
        tokio::time::sleep(Duration::from_secs(15)).await;

        assert_eq!(cache.item_count(), 0);
        assert_eq!(*seen.lock(), vec![("k".to_string(), "v")]);

        cache.close().await;
        assert_eq!(cache.janitor_state(), JanitorState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent() {
        let mut cache: Cache<u32> = Cache::new(Expiration::Never, Duration::from_secs(1));
        cache.close().await;
        cache.close().await;
        assert_eq!(cache.janitor_state(), JanitorState::Stopped);

        // Lazy expiration still works after close
        cache.set("k", 1, Expiration::secs(1));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.item_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_from_seeds_entries() {
        let mut items = HashMap::new();
        items.insert("seeded".to_string(), CacheEntry::persistent(5u32));

        let cache = Cache::new_from(CacheConfig::default(), items);
        assert_eq!(cache.get("seeded"), Some(5));
        assert_eq!(cache.default_expiration(), Expiration::Never);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_janitor() {
        let cache: Cache<u32> = Cache::new(Expiration::Never, Duration::from_secs(1));
        let engine = Arc::clone(cache.engine());
        drop(cache);

        engine.set("k", 1, Expiration::secs(1));
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Nothing swept: the janitor went away with the handle
        assert_eq!(engine.get("k"), None);
        assert_eq!(engine.item_count(), 1);
    }
}
