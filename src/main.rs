//! Mini Cache - demonstration entry point
//!
//! Builds a cache, stores one value and reads it back.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::{Cache, CacheConfig, Expiration};

/// Main entry point for the Mini Cache demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Create a cache with a one minute default TTL and a two minute janitor
/// 3. Store and read back a value
/// 4. Close the cache, stopping the janitor
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::new(Expiration::secs(60), Duration::from_secs(120));
    info!(
        "Configuration: default_expiration={:?}, cleanup_interval={}s",
        config.default_expiration,
        config.cleanup_interval.as_secs()
    );

    let mut cache = Cache::with_config(config);
    cache.on_evicted(|key, value: i64| info!("Evicted {}={}", key, value));

    cache.set("k", 123, Expiration::secs(60));

    match cache.add("k", 456, Expiration::Default) {
        Ok(()) => info!("Added k"),
        Err(err) => warn!("{}", err),
    }

    let value = cache.get("k").context("k should be cached")?;
    println!("{value}");

    info!("Items: {:?}, stats: {:?}", cache.items(), cache.stats());

    cache.close().await;
    info!("Cache closed");

    Ok(())
}
