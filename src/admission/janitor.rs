//! Background eviction of stale client entries.
//!
//! # Responsibilities
//! - Sweep the registry on a fixed cadence
//! - Evict clients idle for longer than the staleness threshold
//! - Exit cleanly when the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time;

use super::registry::ClientRegistry;
use crate::observability::metrics;

/// Fixed pause between consecutive sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A client idle for this many sweep intervals is evicted. Long enough
/// that no client is dropped mid-burst, short enough to reclaim memory
/// promptly under churn of many distinct clients.
const STALENESS_MULTIPLIER: u32 = 3;

/// Periodic sweeper that keeps registry memory bounded.
///
/// Exactly one janitor runs per registry, spawned alongside the server
/// and subscribed to the shutdown coordinator so that repeated server
/// construction never leaks a perpetual task.
pub struct Janitor {
    registry: Arc<ClientRegistry>,
    sweep_interval: Duration,
    stale_threshold: Duration,
}

impl Janitor {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self::with_interval(registry, SWEEP_INTERVAL)
    }

    fn with_interval(registry: Arc<ClientRegistry>, sweep_interval: Duration) -> Self {
        Self {
            registry,
            sweep_interval,
            stale_threshold: sweep_interval * STALENESS_MULTIPLIER,
        }
    }

    /// Sweep until the shutdown signal fires. No lock is held between
    /// sweeps; the sweep itself does no I/O and cannot fail, so a single
    /// odd entry can never abort the loop.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            sweep_interval_secs = self.sweep_interval.as_secs(),
            stale_threshold_secs = self.stale_threshold.as_secs(),
            "Janitor starting"
        );

        let mut ticker = time::interval(self.sweep_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Janitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn sweep_once(&self) {
        let evicted = self.registry.sweep(Instant::now(), self.stale_threshold);
        let tracked = self.registry.len();
        metrics::record_tracked_clients(tracked);

        if evicted > 0 {
            tracing::debug!(evicted, tracked, "Swept stale client entries");
        }
    }
}
