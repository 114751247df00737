//! Error types for command acceptance.

use alset_env::Gear;
use thiserror::Error;

/// Why a vehicle command was refused.
///
/// A rejected command leaves every part of the vehicle state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectedCommand {
    /// Speed commands are refused while parked
    #[error("Vehicle is in park")]
    GearInPark,

    /// Target speed points the other way than the gear drives
    #[error("Target {target} mph is the wrong direction for {gear}")]
    DirectionMismatch { gear: Gear, target: f64 },

    /// Brake target is faster than the vehicle is going
    #[error("Cannot brake to {target} mph from {velocity} mph")]
    TargetExceedsVelocity { target: f64, velocity: f64 },

    /// Gear changes need the vehicle (nearly) stopped
    #[error("Can only change gear at low speeds (currently {velocity} mph)")]
    GearChangeAtSpeed { velocity: f64 },

    /// The requested gear cannot be selected
    #[error("Gear {0} is not available")]
    GearUnavailable(Gear),
}
