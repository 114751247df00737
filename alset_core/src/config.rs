//! Vehicle configuration and control thresholds.
//!
//! `VehicleConfig` holds the state the vehicle starts a session in (and
//! returns to on a vehicle reset). The thresholds below are the fixed
//! constants the control policies are written against.

use alset_env::{Gear, RoadClass};
use serde::{Deserialize, Serialize};

/// Distance reported by a range sensor that sees nothing.
pub const NOTHING_DETECTED: f64 = i32::MAX as f64;

/// Front distance under which a car is considered "in front".
pub const FRONT_DETECTION_RANGE: f64 = 100.0;

/// Rear distance under which a car is considered "behind".
pub const REAR_DETECTION_RANGE: f64 = 20.0;

/// Light level below which the headlights come on.
pub const HEADLIGHT_LIGHT_THRESHOLD: f64 = 200.0;

/// Light level below which high beams may be used.
pub const HIGH_BEAM_LIGHT_THRESHOLD: f64 = 50.0;

/// Minimum speed (mph) for high beams.
pub const HIGH_BEAM_MIN_SPEED: f64 = 25.0;

/// Speed magnitude under which the vehicle is considered stopped by braking.
pub const STOPPING_BAND: f64 = 5.0;

/// Maximum speed magnitude at which a gear change is accepted.
pub const GEAR_CHANGE_MAX_SPEED: f64 = 5.0;

/// Speed magnitude at or below which acceleration jump-starts.
pub const LAUNCH_FLOOR: f64 = 10.0;

/// Jump-start multiplier applied to `LAUNCH_FLOOR`.
pub const LAUNCH_FACTOR: f64 = 1.2;

/// Per-tick multiplier once past the launch floor.
pub const ACCELERATION_FACTOR: f64 = 1.10;

/// Gap change (per tick) while accelerating.
pub const ACCELERATION_GAP_STEP: f64 = 10.0;

/// Narrowest lane the scanners will report.
pub const MIN_LANE_WIDTH: f64 = 7.0;

/// Width of the vehicle, used to derive line distances from lane width.
pub const VEHICLE_WIDTH: f64 = 6.0;

/// Initial state of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Initial velocity (mph)
    pub velocity: f64,

    /// Initial road classification
    pub road_class: RoadClass,

    /// Number of lanes on the initial road
    pub lane_count: i64,

    /// Initial lane (1 is the leftmost lane)
    pub lane: i64,

    /// Initial gear
    pub gear: Gear,

    /// Whether cruise control starts engaged
    pub cruise_control: bool,

    /// Whether the initial road has lane markings
    pub marked_road: bool,

    /// Lane width reported by the scanners
    pub lane_width: f64,

    /// Distance to the left lane line
    pub left_line: f64,

    /// Distance to the right lane line
    pub right_line: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            velocity: 60.0,
            road_class: RoadClass::Highway,
            lane_count: 4,
            lane: 2,
            gear: Gear::Drive,
            cruise_control: true,
            marked_road: true,
            lane_width: 12.0,
            left_line: 3.0,
            right_line: 3.0,
        }
    }
}

impl VehicleConfig {
    /// Returns a config for a vehicle parked on a local road.
    pub fn parked() -> Self {
        Self {
            velocity: 0.0,
            road_class: RoadClass::Local,
            lane_count: 1,
            lane: 1,
            gear: Gear::Park,
            cruise_control: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_start() {
        let config = VehicleConfig::default();
        assert_eq!(config.velocity, 60.0);
        assert_eq!(config.road_class, RoadClass::Highway);
        assert_eq!(config.lane_count, 4);
        assert_eq!(config.lane, 2);
        assert_eq!(config.gear, Gear::Drive);
        assert!(config.cruise_control);
        assert!(config.marked_road);
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: VehicleConfig =
            serde_json::from_str(r#"{"velocity": 30.0, "lane_count": 3}"#).unwrap();
        assert_eq!(config.velocity, 30.0);
        assert_eq!(config.lane_count, 3);
        assert_eq!(config.lane, 2);
    }
}
