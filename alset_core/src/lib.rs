//! Alset Core - Deterministic Vehicle Control Loop
//!
//! A tick-driven controller for a simulated car:
//! 1. **Acceptance**: operator commands are validated once and become intents
//! 2. **Policies**: eight ordered policies move the vehicle state each tick
//! 3. **Display**: a read-only dashboard snapshot is projected after every tick
//!
//! Time, input and rendering live outside this crate (see `alset_env`).

pub mod actuation;
pub mod commands;
pub mod config;
pub mod control_loop;
pub mod display;
pub mod error;
pub mod policies;
pub mod sensors;
pub mod state;

// Re-export key types for convenience
pub use actuation::{Actuation, BrakeIntensity, Headlight, PendingIntent};
pub use config::VehicleConfig;
pub use control_loop::{ControlLoop, TickEvents};
pub use display::{DisplaySnapshot, LaneWarning};
pub use error::RejectedCommand;
pub use policies::LaneChange;
pub use sensors::{MotionState, Navigation, Perception, RoadSensors};
pub use state::VehicleState;
