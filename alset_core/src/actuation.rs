//! Vehicle actuation and the motion policies (brake / accelerate).
//!
//! The motion policies are free functions over the sensor values they touch,
//! so the control loop can hand them disjoint borrows of its state.

use crate::config::{
    ACCELERATION_FACTOR, ACCELERATION_GAP_STEP, LAUNCH_FACTOR, LAUNCH_FLOOR, STOPPING_BAND,
};
use crate::sensors::{MotionState, Navigation, Perception};
use alset_env::{Gear, RoadClass, TurnSignal};
use serde::{Deserialize, Serialize};

/// Headlight level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Headlight {
    #[default]
    Off,
    Low,
    High,
}

impl Headlight {
    pub fn is_on(&self) -> bool {
        !matches!(self, Headlight::Off)
    }
}

/// Actuator state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actuation {
    pub cruise_control: bool,
    pub headlight: Headlight,
    pub gear: Gear,
    pub turn_signal: TurnSignal,
    pub wipers: bool,
}

impl Actuation {
    pub fn new(cruise_control: bool, gear: Gear) -> Self {
        Self {
            cruise_control,
            headlight: Headlight::Off,
            gear,
            turn_signal: TurnSignal::None,
            wipers: false,
        }
    }

    /// Engages cruise control if on a highway and moving forward.
    ///
    /// Returns true if cruise control is now active.
    pub fn start_cruise(&mut self, motion: &MotionState, navigation: &Navigation) -> bool {
        if navigation.road_class() == RoadClass::Highway && motion.velocity > 0.0 {
            self.cruise_control = true;
        }
        self.cruise_control
    }

    pub fn stop_cruise(&mut self) {
        self.cruise_control = false;
    }
}

impl Default for Actuation {
    fn default() -> Self {
        Self::new(false, Gear::Park)
    }
}

/// How hard to brake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrakeIntensity {
    Light,
    Firm,
    Hard,
}

impl BrakeIntensity {
    /// Velocity multiplier applied per tick.
    pub fn decay(&self) -> f64 {
        match self {
            BrakeIntensity::Light => 0.95,
            BrakeIntensity::Firm => 0.90,
            BrakeIntensity::Hard => 0.85,
        }
    }

    /// Growth of the front gap per tick while still above the stopping band.
    pub fn gap_margin(&self) -> f64 {
        match self {
            BrakeIntensity::Light => 10.0,
            BrakeIntensity::Firm => 15.0,
            BrakeIntensity::Hard => 20.0,
        }
    }

    /// Intensity for an obstacle at `distance` ahead, if braking is needed.
    pub fn for_front_distance(distance: f64) -> Option<Self> {
        if distance > 20.0 && distance <= 100.0 {
            Some(BrakeIntensity::Light)
        } else if distance > 10.0 && distance <= 20.0 {
            Some(BrakeIntensity::Firm)
        } else if distance > 0.0 && distance <= 10.0 {
            Some(BrakeIntensity::Hard)
        } else {
            None
        }
    }
}

/// A speed target the vehicle is working toward across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum PendingIntent {
    #[default]
    None,
    Accelerate(f64),
    Brake(f64),
}

impl PendingIntent {
    pub fn target(&self) -> Option<f64> {
        match self {
            PendingIntent::None => None,
            PendingIntent::Accelerate(t) | PendingIntent::Brake(t) => Some(*t),
        }
    }

    pub fn is_accelerating(&self) -> bool {
        matches!(self, PendingIntent::Accelerate(_))
    }

    /// Returns true once `velocity` satisfies this intent in `gear`.
    ///
    /// Only Drive and Reverse can complete an intent.
    pub fn is_reached(&self, velocity: f64, gear: Gear) -> bool {
        match (*self, gear) {
            (PendingIntent::None, _) => true,
            (PendingIntent::Accelerate(t), Gear::Drive) => velocity >= t,
            (PendingIntent::Accelerate(t), Gear::Reverse) => velocity <= t,
            (PendingIntent::Brake(t), Gear::Drive) => velocity <= t,
            (PendingIntent::Brake(t), Gear::Reverse) => velocity >= t,
            _ => false,
        }
    }
}

/// Applies one tick of braking.
pub fn brake(
    motion: &mut MotionState,
    perception: &mut Perception,
    gear: Gear,
    intensity: BrakeIntensity,
) {
    // sampled before decay
    let reversing = motion.velocity < STOPPING_BAND;
    motion.velocity *= intensity.decay();

    if gear.is_forward() || !reversing {
        if motion.velocity < STOPPING_BAND {
            motion.velocity = 0.0;
        } else {
            perception.distance_front += intensity.gap_margin();
        }
    } else if gear == Gear::Reverse && motion.velocity > -STOPPING_BAND {
        motion.velocity = 0.0;
    }
}

/// Applies one tick of firm braking toward `target`, snapping onto it once
/// crossed.
pub fn brake_to(motion: &mut MotionState, perception: &mut Perception, gear: Gear, target: f64) {
    brake(motion, perception, gear, BrakeIntensity::Firm);

    let v = motion.velocity;
    if (gear == Gear::Drive && v <= target) || (gear == Gear::Reverse && v >= target) {
        motion.velocity = target;
    }
    // Targets inside the stopping band snap once braking reached the band.
    if target < STOPPING_BAND && gear == Gear::Drive && motion.velocity < STOPPING_BAND {
        motion.velocity = target;
    }
    if target > -STOPPING_BAND && gear == Gear::Reverse && motion.velocity > -STOPPING_BAND {
        motion.velocity = target;
    }
}

/// Applies one tick of acceleration toward `target`, clamping onto it once
/// crossed.
pub fn accelerate_to(
    motion: &mut MotionState,
    perception: &mut Perception,
    gear: Gear,
    target: f64,
) {
    if gear == Gear::Drive && motion.velocity <= LAUNCH_FLOOR {
        motion.velocity = LAUNCH_FLOOR * LAUNCH_FACTOR;
    } else if gear == Gear::Reverse && motion.velocity >= -LAUNCH_FLOOR {
        motion.velocity = -LAUNCH_FLOOR * LAUNCH_FACTOR;
    } else {
        motion.velocity *= ACCELERATION_FACTOR;
    }

    match gear {
        Gear::Drive => {
            perception.distance_front -= ACCELERATION_GAP_STEP;
            perception.distance_behind += ACCELERATION_GAP_STEP;
            if motion.velocity >= target {
                motion.velocity = target;
            }
        }
        Gear::Reverse => {
            perception.distance_front += ACCELERATION_GAP_STEP;
            if motion.velocity <= target {
                motion.velocity = target;
            }
        }
        Gear::Park | Gear::Neutral => {}
    }
}
