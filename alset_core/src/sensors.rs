//! Sensor models: what the vehicle knows about itself and its surroundings.
//!
//! - `MotionState`: the IMU's velocity estimate
//! - `RoadSensors`: lane scanners (width and line distances)
//! - `Navigation`: route classification and lane bookkeeping
//! - `Perception`: cameras and range sensors
//!
//! These are plain values. Only the control loop mutates them.

use crate::config::{VehicleConfig, MIN_LANE_WIDTH, NOTHING_DETECTED, VEHICLE_WIDTH};
use alset_env::{RoadClass, Side};
use serde::{Deserialize, Serialize};

/// Vehicle velocity in mph. Negative while reversing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    pub velocity: f64,
}

impl MotionState {
    pub fn new(velocity: f64) -> Self {
        Self { velocity }
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != 0.0
    }
}

/// Lane scanners.
///
/// On an unmarked road every query reports unknown (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadSensors {
    lane_width: f64,
    right_line: f64,
    left_line: f64,
    marked: bool,
}

impl RoadSensors {
    pub fn new(lane_width: f64, right_line: f64, left_line: f64, marked: bool) -> Self {
        Self {
            lane_width,
            right_line,
            left_line,
            marked,
        }
    }

    /// Updates the lane width and recenters the vehicle in the lane.
    ///
    /// Ignored on unmarked roads. The stored width never drops below
    /// `MIN_LANE_WIDTH`, but line distances follow the raw width, so a lane
    /// narrower than the vehicle puts both lines under it.
    pub fn set_lane_width(&mut self, width: f64) {
        if !self.marked {
            return;
        }
        self.lane_width = width.max(MIN_LANE_WIDTH);
        let margin = (width - VEHICLE_WIDTH) / 2.0;
        self.right_line = margin;
        self.left_line = margin;
    }

    pub fn set_marked(&mut self, marked: bool) {
        self.marked = marked;
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn lane_width(&self) -> Option<f64> {
        self.marked.then_some(self.lane_width)
    }

    pub fn distance_from_line(&self, side: Side) -> Option<f64> {
        if !self.marked {
            return None;
        }
        Some(match side {
            Side::Left => self.left_line,
            Side::Right => self.right_line,
        })
    }
}

impl Default for RoadSensors {
    fn default() -> Self {
        Self::new(8.0, 1.0, 1.0, false)
    }
}

/// Route classification and lane bookkeeping.
///
/// `current_lane` is kept in `[1, lane_count]` by every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    road_class: RoadClass,
    lane_count: u32,
    current_lane: u32,
}

impl Navigation {
    /// Creates a navigation state, clamping out-of-range values.
    pub fn new(road_class: RoadClass, lane_count: i64, lane: i64) -> Self {
        let lane_count = clamp_lane_count(lane_count);
        Self {
            road_class,
            lane_count,
            current_lane: clamp_lane(lane, lane_count),
        }
    }

    pub fn from_config(config: &VehicleConfig) -> Self {
        Self::new(config.road_class, config.lane_count, config.lane)
    }

    pub fn road_class(&self) -> RoadClass {
        self.road_class
    }

    pub fn set_road_class(&mut self, road_class: RoadClass) {
        self.road_class = road_class;
    }

    pub fn lane_count(&self) -> u32 {
        self.lane_count
    }

    pub fn current_lane(&self) -> u32 {
        self.current_lane
    }

    /// Sets the lane count. Values below 1 clamp to 1; the current lane is
    /// pulled back into range.
    pub fn set_lane_count(&mut self, count: i64) {
        self.lane_count = clamp_lane_count(count);
        self.current_lane = self.current_lane.min(self.lane_count);
    }

    /// Sets the current lane, clamped into `[1, lane_count]`.
    pub fn set_lane(&mut self, lane: i64) {
        self.current_lane = clamp_lane(lane, self.lane_count);
    }

    /// Returns true if the adjacent lane on `side` exists.
    pub fn has_lane_toward(&self, side: Side) -> bool {
        match side {
            Side::Left => self.current_lane > 1,
            Side::Right => self.current_lane < self.lane_count,
        }
    }

    /// Moves one lane toward `side` if that lane exists.
    ///
    /// Returns true if the lane changed.
    pub fn shift_lane(&mut self, side: Side) -> bool {
        if !self.has_lane_toward(side) {
            return false;
        }
        match side {
            Side::Left => self.current_lane -= 1,
            Side::Right => self.current_lane += 1,
        }
        true
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new(RoadClass::Unregistered, 1, 1)
    }
}

fn clamp_lane_count(count: i64) -> u32 {
    count.clamp(1, u32::MAX as i64) as u32
}

fn clamp_lane(lane: i64, lane_count: u32) -> u32 {
    lane.clamp(1, lane_count as i64) as u32
}

/// Cameras and range sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    pub light_level: f64,
    pub rain: bool,

    /// Distance to the car in front (`NOTHING_DETECTED` if none)
    pub distance_front: f64,

    /// Distance to the car behind (`NOTHING_DETECTED` if none)
    pub distance_behind: f64,

    pub object_left: bool,
    pub object_right: bool,
}

impl Perception {
    /// Sets the light level; negative readings clamp to 0.
    pub fn set_light_level(&mut self, level: f64) {
        self.light_level = level.max(0.0);
    }

    pub fn object_on(&self, side: Side) -> bool {
        match side {
            Side::Left => self.object_left,
            Side::Right => self.object_right,
        }
    }

    pub fn set_object(&mut self, side: Side, present: bool) {
        match side {
            Side::Left => self.object_left = present,
            Side::Right => self.object_right = present,
        }
    }
}

impl Default for Perception {
    fn default() -> Self {
        Self {
            light_level: 200.0,
            rain: false,
            distance_front: NOTHING_DETECTED,
            distance_behind: NOTHING_DETECTED,
            object_left: false,
            object_right: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmarked_road_reports_unknown() {
        let mut scanners = RoadSensors::new(12.0, 3.0, 3.0, true);
        assert_eq!(scanners.lane_width(), Some(12.0));

        scanners.set_marked(false);
        assert_eq!(scanners.lane_width(), None);
        assert_eq!(scanners.distance_from_line(Side::Left), None);
        assert_eq!(scanners.distance_from_line(Side::Right), None);
    }

    #[test]
    fn test_set_lane_width_recenters() {
        let mut scanners = RoadSensors::new(12.0, 3.0, 3.0, true);
        scanners.set_lane_width(10.0);
        assert_eq!(scanners.lane_width(), Some(10.0));
        assert_eq!(scanners.distance_from_line(Side::Left), Some(2.0));

        // Narrow lane: width floors at 7, lines go under the vehicle
        scanners.set_lane_width(4.0);
        assert_eq!(scanners.lane_width(), Some(7.0));
        assert_eq!(scanners.distance_from_line(Side::Right), Some(-1.0));
    }

    #[test]
    fn test_set_lane_width_ignored_when_unmarked() {
        let mut scanners = RoadSensors::default();
        scanners.set_lane_width(20.0);
        scanners.set_marked(true);
        assert_eq!(scanners.lane_width(), Some(8.0));
    }

    #[test]
    fn test_navigation_clamps_on_construction() {
        let nav = Navigation::new(RoadClass::Highway, 0, 5);
        assert_eq!(nav.lane_count(), 1);
        assert_eq!(nav.current_lane(), 1);

        let nav = Navigation::new(RoadClass::Local, 3, -2);
        assert_eq!(nav.current_lane(), 1);
    }

    #[test]
    fn test_lane_count_shrink_pulls_lane_in() {
        let mut nav = Navigation::new(RoadClass::Highway, 4, 4);
        nav.set_lane_count(2);
        assert_eq!(nav.current_lane(), 2);

        nav.set_lane_count(-7);
        assert_eq!(nav.lane_count(), 1);
        assert_eq!(nav.current_lane(), 1);
    }

    #[test]
    fn test_shift_lane_stays_in_range() {
        let mut nav = Navigation::new(RoadClass::Highway, 2, 1);
        assert!(!nav.shift_lane(Side::Left));
        assert!(nav.shift_lane(Side::Right));
        assert_eq!(nav.current_lane(), 2);
        assert!(!nav.shift_lane(Side::Right));
        assert_eq!(nav.current_lane(), 2);
    }

    #[test]
    fn test_light_level_clamps_negative() {
        let mut perception = Perception::default();
        perception.set_light_level(-40.0);
        assert_eq!(perception.light_level, 0.0);
    }

    #[test]
    fn test_default_perception_sees_nothing() {
        let perception = Perception::default();
        assert_eq!(perception.distance_front, NOTHING_DETECTED);
        assert_eq!(perception.distance_behind, NOTHING_DETECTED);
        assert!(!perception.object_on(Side::Left));
        assert!(!perception.object_on(Side::Right));
    }
}
