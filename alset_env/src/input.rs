//! Operator input abstraction for the control loop.

use crate::types::TickInputs;

/// The queue feeding the control loop.
///
/// The loop is the only consumer. It polls once per tick boundary and gets
/// at most one environment override and at most one vehicle command; anything
/// else stays queued for later ticks.
///
/// # Implementations
///
/// - **Live**: `ChannelInput` - any number of producers on a tokio channel
/// - **Simulation**: `ScriptedInput` - events keyed by tick number
pub trait InputSource: Send {
    /// Takes the inputs for the tick about to run.
    ///
    /// # Arguments
    /// * `tick` - Index of the tick about to run (starting at 0)
    fn poll(&mut self, tick: u64) -> TickInputs;

    /// Returns true once no further input can ever arrive.
    fn is_exhausted(&self) -> bool;
}

/// An input source that never yields anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _tick: u64) -> TickInputs {
        TickInputs::default()
    }

    fn is_exhausted(&self) -> bool {
        true
    }
}
