//! The state bundle owned by the control loop.

use crate::actuation::{Actuation, PendingIntent};
use crate::config::VehicleConfig;
use crate::sensors::{MotionState, Navigation, Perception, RoadSensors};
use alset_env::Side;
use serde::{Deserialize, Serialize};

/// Every entity the control loop reads or mutates during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub motion: MotionState,
    pub road: RoadSensors,
    pub navigation: Navigation,
    pub perception: Perception,
    pub actuation: Actuation,

    /// Speed target carried across ticks
    pub intent: PendingIntent,

    /// Side of a lane change refused this tick because that side was occupied
    pub blocked_lane_change: Option<Side>,
}

impl VehicleState {
    /// Creates the session-start state described by `config`.
    pub fn from_config(config: &VehicleConfig) -> Self {
        Self {
            motion: MotionState::new(config.velocity),
            road: RoadSensors::new(
                config.lane_width,
                config.right_line,
                config.left_line,
                config.marked_road,
            ),
            navigation: Navigation::from_config(config),
            perception: Perception::default(),
            actuation: Actuation::new(config.cruise_control, config.gear),
            intent: PendingIntent::None,
            blocked_lane_change: None,
        }
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::from_config(&VehicleConfig::default())
    }
}
