//! SimWorld - the simulation harness container.

use crate::error::SimError;
use alset_core::{ControlLoop, DisplaySnapshot, VehicleConfig};
use alset_env::{InputSource, TickPacer, DEFAULT_TICK_INTERVAL};
use std::time::Duration;
use tracing::debug;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Number of ticks to run
    pub ticks: u64,

    /// Spacing between ticks
    pub tick_interval: Duration,

    /// Vehicle state at session start
    pub vehicle: VehicleConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 30,
            tick_interval: DEFAULT_TICK_INTERVAL,
            vehicle: VehicleConfig::default(),
        }
    }
}

/// The SimWorld - one control loop and the input feeding it.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// The vehicle controller
    control: ControlLoop,

    /// Operator input
    input: Box<dyn InputSource>,
}

impl SimWorld {
    /// Creates a new SimWorld with the given configuration.
    pub fn new(config: SimConfig, input: Box<dyn InputSource>) -> Self {
        let control = ControlLoop::new(config.vehicle.clone());
        Self { config, control, input }
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    /// Returns true once the input source can yield nothing more.
    pub fn input_exhausted(&self) -> bool {
        self.input.is_exhausted()
    }

    /// Polls the input source and runs one tick.
    pub fn step(&mut self) -> DisplaySnapshot {
        let tick = self.control.tick_count();
        let inputs = self.input.poll(tick);
        if !inputs.is_empty() {
            debug!("tick {}: inputs {:?}", tick, inputs);
        }
        self.control.tick_with(inputs)
    }

    /// Runs `config.ticks` ticks paced by `pacer`.
    ///
    /// `on_tick` sees the loop and snapshot after every tick, along with the
    /// pacer time at which the tick ran. An error from it stops the run.
    /// Returns the number of ticks run.
    pub async fn run_async<F>(
        &mut self,
        pacer: &dyn TickPacer,
        mut on_tick: F,
    ) -> Result<u64, SimError>
    where
        F: FnMut(&ControlLoop, &DisplaySnapshot, Duration) -> Result<(), SimError>,
    {
        for i in 0..self.config.ticks {
            let snapshot = self.step();
            on_tick(&self.control, &snapshot, pacer.now())?;

            if i + 1 < self.config.ticks {
                pacer.wait_next_tick().await;
            }
        }
        Ok(self.control.tick_count())
    }
}
