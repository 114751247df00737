//! Virtual-clock pacer for deterministic runs.

use alset_env::{TickPacer, DEFAULT_TICK_INTERVAL};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pacer backed by a virtual clock.
///
/// Waiting for the next tick advances the clock by one tick interval and
/// returns immediately, so a scenario runs as fast as the CPU allows while
/// reporting the same timeline a live run would.
pub struct SimPacer {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<AtomicU64>,

    /// Virtual spacing between ticks
    interval: Duration,
}

impl SimPacer {
    /// Creates a pacer at virtual time zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            virtual_time_ns: Arc::new(AtomicU64::new(0)),
            interval,
        }
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        self.virtual_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns.load(Ordering::SeqCst)
    }
}

impl Default for SimPacer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Clone for SimPacer {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            interval: self.interval,
        }
    }
}

#[async_trait]
impl TickPacer for SimPacer {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    async fn wait_next_tick(&self) {
        self.advance_time(self.interval);
    }
}
