//! Alset Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" boundary of the vehicle controller:
//! the control core never reads a console or sleeps on a timer itself.
//! Everything that comes from outside is expressed here:
//! - Input (`InputSource::poll()`), one event per class per tick
//! - Pacing (`TickPacer::wait_next_tick()`)
//! - The shared vocabulary (`Gear`, `TurnSignal`, `RoadClass`, commands)
//!
//! Live drivers use the Tokio implementations; the simulation harness
//! provides scripted input and a virtual clock, so every run is
//! reproducible.
//!
//! # Example
//!
//! ```ignore
//! use alset_env::{ChannelInput, InputSource, VehicleCommand};
//!
//! let (tx, mut input) = ChannelInput::channel();
//! tx.send_command(VehicleCommand::BrakeTo(30.0))?;
//!
//! let inputs = input.poll(0);
//! control.tick(inputs.environment, inputs.command);
//! ```

mod error;
mod input;
mod pacer;
mod tokio_impl;
mod types;

pub use error::EnvError;
pub use input::{InputSource, NoInput};
pub use pacer::{TickPacer, DEFAULT_TICK_INTERVAL};
pub use tokio_impl::{ChannelInput, InputSender, TokioPacer};
pub use types::{
    EnvironmentOverride, Gear, InputEvent, RoadClass, Side, TickInputs, TurnSignal,
    VehicleCommand,
};
