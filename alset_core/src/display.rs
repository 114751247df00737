//! Dashboard snapshot: a read-only projection of the vehicle state.
//!
//! The snapshot is recomputed from scratch after every tick; nothing in the
//! control policies writes to it.

use crate::actuation::Headlight;
use crate::config::{FRONT_DETECTION_RANGE, REAR_DETECTION_RANGE};
use crate::state::VehicleState;
use alset_env::{Gear, RoadClass, Side, TurnSignal};
use serde::{Deserialize, Serialize};

/// Lane warning shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneWarning {
    #[default]
    None,
    Left,
    Right,
}

impl LaneWarning {
    /// Numeric dashboard code: -1 none, 0 left, 1 right.
    pub fn code(&self) -> i8 {
        match self {
            LaneWarning::None => -1,
            LaneWarning::Left => 0,
            LaneWarning::Right => 1,
        }
    }
}

impl From<Side> for LaneWarning {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => LaneWarning::Left,
            Side::Right => LaneWarning::Right,
        }
    }
}

/// Render-ready dashboard record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    /// Speed rounded to the nearest mph
    pub speed: i32,
    pub gear: Gear,
    pub cruise_control: bool,
    pub wipers: bool,
    pub headlights: Headlight,
    pub cars_in_front: bool,
    pub cars_behind: bool,
    pub cars_left: bool,
    pub cars_right: bool,
    pub lane_warning: LaneWarning,
    pub lane: u32,
    pub lane_count: u32,
    pub left_turn: bool,
    pub right_turn: bool,
    pub rear_camera: bool,
    pub road_class: RoadClass,

    /// Lane width, `None` when the road is unmarked
    pub lane_width: Option<f64>,
}

impl DisplaySnapshot {
    /// Projects the current state.
    pub fn project(state: &VehicleState) -> Self {
        let actuation = &state.actuation;
        let perception = &state.perception;
        let velocity = state.motion.velocity;

        Self {
            speed: velocity.round() as i32,
            gear: actuation.gear,
            cruise_control: actuation.cruise_control,
            wipers: actuation.wipers,
            headlights: actuation.headlight,
            cars_in_front: perception.distance_front < FRONT_DETECTION_RANGE,
            cars_behind: perception.distance_behind < REAR_DETECTION_RANGE,
            cars_left: perception.object_left,
            cars_right: perception.object_right,
            lane_warning: lane_warning(state),
            lane: state.navigation.current_lane(),
            lane_count: state.navigation.lane_count(),
            left_turn: actuation.turn_signal == TurnSignal::Left,
            right_turn: actuation.turn_signal == TurnSignal::Right,
            rear_camera: actuation.gear == Gear::Reverse && velocity <= 0.0,
            road_class: state.navigation.road_class(),
            lane_width: state.road.lane_width(),
        }
    }
}

/// Departure first, then the turn-signal warning, which wins when present.
fn lane_warning(state: &VehicleState) -> LaneWarning {
    match turn_signal_warning(state) {
        Some(side) => side.into(),
        None => lane_departure(state),
    }
}

/// Drifting over a line while moving on a known road.
fn lane_departure(state: &VehicleState) -> LaneWarning {
    if !state.motion.is_moving() || !state.navigation.road_class().is_registered() {
        return LaneWarning::None;
    }

    let over = |side: Side| matches!(state.road.distance_from_line(side), Some(d) if d <= 0.0);
    if over(Side::Right) {
        LaneWarning::Right
    } else if over(Side::Left) {
        LaneWarning::Left
    } else {
        LaneWarning::None
    }
}

/// An active signal toward an occupied side, or a lane change refused this
/// tick for the same reason.
fn turn_signal_warning(state: &VehicleState) -> Option<Side> {
    state
        .actuation
        .turn_signal
        .side()
        .filter(|side| state.perception.object_on(*side))
        .or(state.blocked_lane_change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let snapshot = DisplaySnapshot::project(&VehicleState::default());

        assert_eq!(snapshot.speed, 60);
        assert_eq!(snapshot.gear, Gear::Drive);
        assert!(snapshot.cruise_control);
        assert!(!snapshot.cars_in_front);
        assert!(!snapshot.cars_behind);
        assert_eq!(snapshot.lane_warning, LaneWarning::None);
        assert_eq!(snapshot.lane, 2);
        assert_eq!(snapshot.lane_count, 4);
        assert_eq!(snapshot.lane_width, Some(12.0));
        assert!(!snapshot.rear_camera);
    }

    #[test]
    fn test_speed_rounds() {
        let mut state = VehicleState::default();
        state.motion.velocity = 53.6;
        assert_eq!(DisplaySnapshot::project(&state).speed, 54);

        state.motion.velocity = -12.4;
        assert_eq!(DisplaySnapshot::project(&state).speed, -12);
    }

    #[test]
    fn test_detection_ranges() {
        let mut state = VehicleState::default();
        state.perception.distance_front = 99.0;
        state.perception.distance_behind = 19.0;
        let snapshot = DisplaySnapshot::project(&state);
        assert!(snapshot.cars_in_front);
        assert!(snapshot.cars_behind);

        state.perception.distance_front = 100.0;
        state.perception.distance_behind = 20.0;
        let snapshot = DisplaySnapshot::project(&state);
        assert!(!snapshot.cars_in_front);
        assert!(!snapshot.cars_behind);
    }

    #[test]
    fn test_lane_departure_warning() {
        let mut state = VehicleState::default();
        state.road.set_lane_width(5.0);
        assert_eq!(DisplaySnapshot::project(&state).lane_warning, LaneWarning::Right);

        state.motion.velocity = 0.0;
        assert_eq!(DisplaySnapshot::project(&state).lane_warning, LaneWarning::None);

        state.motion.velocity = 30.0;
        state.navigation.set_road_class(RoadClass::Unregistered);
        assert_eq!(DisplaySnapshot::project(&state).lane_warning, LaneWarning::None);
    }

    #[test]
    fn test_unmarked_road_has_no_departure_warning() {
        let mut state = VehicleState::default();
        state.road.set_lane_width(5.0);
        state.road.set_marked(false);

        let snapshot = DisplaySnapshot::project(&state);
        assert_eq!(snapshot.lane_warning, LaneWarning::None);
        assert_eq!(snapshot.lane_width, None);
    }

    #[test]
    fn test_signal_toward_occupied_side_wins() {
        let mut state = VehicleState::default();
        state.road.set_lane_width(5.0);
        state.actuation.turn_signal = TurnSignal::Left;
        state.perception.object_left = true;

        let snapshot = DisplaySnapshot::project(&state);
        assert_eq!(snapshot.lane_warning, LaneWarning::Left);
        assert!(snapshot.left_turn);

        // Signal toward a clear side leaves the departure warning standing
        state.perception.object_left = false;
        assert_eq!(DisplaySnapshot::project(&state).lane_warning, LaneWarning::Right);
    }

    #[test]
    fn test_blocked_lane_change_warns() {
        let mut state = VehicleState::default();
        state.blocked_lane_change = Some(Side::Right);
        assert_eq!(DisplaySnapshot::project(&state).lane_warning, LaneWarning::Right);
        assert_eq!(LaneWarning::Right.code(), 1);
    }

    #[test]
    fn test_rear_camera() {
        let mut state = VehicleState::default();
        state.actuation.gear = Gear::Reverse;
        state.motion.velocity = 0.0;
        assert!(DisplaySnapshot::project(&state).rear_camera);

        state.motion.velocity = -8.0;
        assert!(DisplaySnapshot::project(&state).rear_camera);
    }
}
