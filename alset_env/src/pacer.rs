//! Tick pacing abstraction.

use async_trait::async_trait;
use std::time::Duration;

/// Default wall-clock spacing between ticks (40 polls of 50ms).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// Controls how time passes between two ticks.
///
/// # Implementations
///
/// - **Production**: `TokioPacer` - sleeps on the tokio timer
/// - **Simulation**: `SimPacer` - advances a virtual clock instantly
#[async_trait]
pub trait TickPacer: Send + Sync + 'static {
    /// Returns the time elapsed since the pacer was created.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the spacing between ticks.
    fn tick_interval(&self) -> Duration;

    /// Suspends until the next tick is due.
    async fn wait_next_tick(&self);
}
