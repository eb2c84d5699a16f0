//! Janitor Task
//!
//! Background task that periodically sweeps expired entries out of a cache
//! engine until it is told to stop.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::CacheEngine;

// == Janitor State ==
/// Lifecycle of a janitor. A stopped janitor is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JanitorState {
    Running,
    Stopped,
}

// == Janitor ==
/// Owner of a spawned sweep task and its single-use stop signal.
///
/// Dropping a janitor delivers the stop signal without waiting for the
/// task; [`shutdown`](Self::shutdown) also waits for it to exit.
#[derive(Debug)]
pub struct Janitor {
    interval: Duration,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Janitor {
    /// Spawns a janitor sweeping `engine` every `interval`.
    ///
    /// The task holds only a weak reference and exits on its own once the
    /// engine has been dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context, or if
    /// `interval` is zero.
    pub fn spawn<V>(engine: Weak<CacheEngine<V>>, interval: Duration) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "mini_cache::Janitor requires a Tokio runtime. \
                 Construct caches with a non-zero cleanup interval from within \
                 a #[tokio::main] or #[tokio::test] context."
            );
        }
        assert!(
            !interval.is_zero(),
            "mini_cache::Janitor requires a non-zero sweep interval"
        );

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run(engine, interval, stop_rx));

        Self {
            interval,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Returns the sweep interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the current lifecycle state.
    ///
    /// A janitor stays `Running` after [`stop`](Self::stop) until its task
    /// has received the signal and exited.
    pub fn state(&self) -> JanitorState {
        match &self.handle {
            Some(handle) if !handle.is_finished() => JanitorState::Running,
            _ => JanitorState::Stopped,
        }
    }

    /// Delivers the stop signal. Later calls do nothing.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The task may already be gone; nothing to signal then
            let _ = stop_tx.send(());
        }
    }

    /// Delivers the stop signal and waits for the task to exit.
    pub async fn shutdown(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!("Janitor task ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sweep loop: one `delete_expired` per tick until stopped.
async fn run<V>(
    engine: Weak<CacheEngine<V>>,
    interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) where
    V: Clone + Send + Sync + 'static,
{
    info!(
        "Starting janitor with interval of {} ms",
        interval.as_millis()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(engine) = engine.upgrade() else {
                    debug!("Cache dropped, janitor exiting");
                    break;
                };

                let removed = engine.delete_expired();
                if removed > 0 {
                    info!("Janitor sweep: removed {} expired entries", removed);
                } else {
                    debug!("Janitor sweep: no expired entries found");
                }
            }
            // Resolves on an explicit stop or when the sender is dropped
            _ = &mut stop_rx => break,
        }
    }

    info!("Janitor stopped");
}
