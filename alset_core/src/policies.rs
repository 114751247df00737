//! Control policies, in the order the control loop runs them.
//!
//! Order matters: later policies see the mutations of earlier ones within the
//! same tick (for example, gear consistency runs after the speed policies and
//! zeroes whatever they produced in Park).

use crate::actuation::{self, Actuation, BrakeIntensity, Headlight, PendingIntent};
use crate::config::{
    FRONT_DETECTION_RANGE, HEADLIGHT_LIGHT_THRESHOLD, HIGH_BEAM_LIGHT_THRESHOLD,
    HIGH_BEAM_MIN_SPEED, REAR_DETECTION_RANGE,
};
use crate::sensors::{MotionState, Navigation, Perception};
use crate::state::VehicleState;
use alset_env::{Gear, Side, TurnSignal};
use tracing::{debug, trace};

/// What the lane-change policy did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneChange {
    /// No signal, or lane changes are not possible right now
    #[default]
    Idle,

    /// Moved one lane toward the side
    Changed(Side),

    /// Refused: an object occupies that side
    Blocked(Side),

    /// Refused: already in the outermost lane on that side
    NoLane(Side),
}

/// 1. Brakes for obstacles ahead (or behind, while reversing).
///
/// Returns the intensity applied, if any. Cancels a pending acceleration.
pub fn obstacle_braking(state: &mut VehicleState) -> Option<BrakeIntensity> {
    if !state.motion.is_moving() {
        return None;
    }

    let gear = state.actuation.gear;
    let intensity = match gear {
        Gear::Drive | Gear::Neutral => {
            BrakeIntensity::for_front_distance(state.perception.distance_front)
        }
        Gear::Reverse => {
            let behind = state.perception.distance_behind;
            (behind > 0.0 && behind < REAR_DETECTION_RANGE).then_some(BrakeIntensity::Hard)
        }
        Gear::Park => None,
    }?;

    actuation::brake(&mut state.motion, &mut state.perception, gear, intensity);
    if state.intent.is_accelerating() {
        debug!("obstacle braking cancelled pending acceleration");
        state.intent = PendingIntent::None;
    }
    Some(intensity)
}

/// 2. Works toward a pending acceleration target.
///
/// Returns true if the target was reached this tick.
pub fn pending_acceleration(state: &mut VehicleState) -> bool {
    let PendingIntent::Accelerate(target) = state.intent else {
        return false;
    };
    let gear = state.actuation.gear;

    actuation::accelerate_to(&mut state.motion, &mut state.perception, gear, target);
    finish_intent_if_reached(state, gear)
}

/// 3. Works toward a pending braking target.
///
/// Returns true if the target was reached this tick.
pub fn pending_braking(state: &mut VehicleState) -> bool {
    let PendingIntent::Brake(target) = state.intent else {
        return false;
    };
    let gear = state.actuation.gear;

    actuation::brake_to(&mut state.motion, &mut state.perception, gear, target);
    finish_intent_if_reached(state, gear)
}

fn finish_intent_if_reached(state: &mut VehicleState, gear: Gear) -> bool {
    if state.intent.is_reached(state.motion.velocity, gear) {
        debug!("reached target {:?}", state.intent.target());
        state.intent = PendingIntent::None;
        true
    } else {
        false
    }
}

/// 4. Turns headlights on in the dark or rain, off otherwise.
pub fn headlights(perception: &Perception, actuation: &mut Actuation) {
    let needs_light = perception.light_level < HEADLIGHT_LIGHT_THRESHOLD || perception.rain;

    if needs_light && actuation.headlight == Headlight::Off {
        trace!("headlights on");
        actuation.headlight = Headlight::Low;
    } else if !needs_light && actuation.headlight.is_on() {
        trace!("headlights off");
        actuation.headlight = Headlight::Off;
    }
}

/// 5. Carries out a signalled lane change while cruising.
///
/// The signal is consumed whether or not the lane changed. Passing a car
/// clears the object flag on the side we left.
pub fn lane_change(
    motion: &MotionState,
    navigation: &mut Navigation,
    perception: &mut Perception,
    actuation: &mut Actuation,
) -> LaneChange {
    if !motion.is_moving() || !actuation.cruise_control || navigation.lane_count() <= 1 {
        return LaneChange::Idle;
    }
    let Some(side) = actuation.turn_signal.side() else {
        return LaneChange::Idle;
    };

    actuation.turn_signal = TurnSignal::None;

    if perception.object_on(side) {
        debug!("lane change {:?} blocked", side);
        return LaneChange::Blocked(side);
    }
    if !navigation.shift_lane(side) {
        return LaneChange::NoLane(side);
    }

    perception.set_object(side.opposite(), false);
    debug!("changed lane {:?} to {}", side, navigation.current_lane());
    LaneChange::Changed(side)
}

/// 6. Raises or lowers the high beams.
///
/// High beams drop back to low as soon as their conditions lapse.
pub fn high_beams(motion: &MotionState, perception: &Perception, actuation: &mut Actuation) {
    let open_dark_road = perception.light_level < HIGH_BEAM_LIGHT_THRESHOLD
        && motion.velocity > HIGH_BEAM_MIN_SPEED
        && !perception.rain
        && perception.distance_front >= FRONT_DETECTION_RANGE;

    if open_dark_road {
        if actuation.headlight == Headlight::Low {
            trace!("high beams on");
            actuation.headlight = Headlight::High;
        }
    } else if actuation.headlight == Headlight::High {
        trace!("high beams off");
        actuation.headlight = Headlight::Low;
    }
}

/// 7. Wipers follow the rain sensor.
pub fn wipers(perception: &Perception, actuation: &mut Actuation) {
    actuation.wipers = perception.rain;
}

/// 8. Keeps velocity and cruise control consistent with the gear.
pub fn gear_consistency(
    motion: &mut MotionState,
    navigation: &Navigation,
    actuation: &mut Actuation,
) {
    let gear = actuation.gear;
    let contradicts_gear = match gear {
        Gear::Park => motion.velocity != 0.0,
        Gear::Reverse => motion.velocity > 0.0,
        Gear::Drive => motion.velocity < 0.0,
        Gear::Neutral => false,
    };
    if contradicts_gear {
        debug!("velocity {} zeroed in {}", motion.velocity, gear);
        motion.velocity = 0.0;
    }

    if gear != Gear::Drive {
        if actuation.cruise_control {
            debug!("cruise control off in {}", gear);
        }
        actuation.stop_cruise();
    } else if !actuation.cruise_control && actuation.start_cruise(motion, navigation) {
        debug!("cruise control on");
    }
}
