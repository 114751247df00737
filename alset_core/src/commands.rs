//! Acceptance and application of operator input.
//!
//! Vehicle commands are validated exactly once, when submitted. A command
//! that passes only records an intent (or flips an actuator); the speed
//! change itself happens in later ticks.

use crate::actuation::PendingIntent;
use crate::config::{VehicleConfig, GEAR_CHANGE_MAX_SPEED};
use crate::error::RejectedCommand;
use crate::sensors::{MotionState, Navigation, Perception};
use crate::state::VehicleState;
use alset_env::{EnvironmentOverride, Gear, VehicleCommand};
use tracing::debug;

/// Validates `command` against the current state and applies it.
///
/// On rejection nothing is mutated.
pub fn accept(
    state: &mut VehicleState,
    command: VehicleCommand,
    config: &VehicleConfig,
) -> Result<(), RejectedCommand> {
    let gear = state.actuation.gear;
    let velocity = state.motion.velocity;

    match command {
        VehicleCommand::BrakeTo(target) => {
            check_speed_target(gear, target)?;
            let exceeds = match gear {
                Gear::Reverse => target < velocity,
                _ => target > velocity,
            };
            if exceeds {
                return Err(RejectedCommand::TargetExceedsVelocity { target, velocity });
            }
            state.intent = PendingIntent::Brake(target);
        }
        VehicleCommand::AccelerateTo(target) => {
            check_speed_target(gear, target)?;
            state.intent = PendingIntent::Accelerate(target);
        }
        VehicleCommand::SetGear(new_gear) => {
            if velocity.abs() > GEAR_CHANGE_MAX_SPEED {
                return Err(RejectedCommand::GearChangeAtSpeed { velocity });
            }
            if new_gear == Gear::Neutral {
                return Err(RejectedCommand::GearUnavailable(new_gear));
            }
            state.actuation.gear = new_gear;
        }
        VehicleCommand::SetTurnSignal(signal) => {
            state.actuation.turn_signal = signal;
        }
        VehicleCommand::Reset => {
            state.motion = MotionState::new(config.velocity);
            state.navigation = Navigation::from_config(config);
        }
    }

    debug!("accepted {}", command);
    Ok(())
}

fn check_speed_target(gear: Gear, target: f64) -> Result<(), RejectedCommand> {
    match gear {
        Gear::Park => Err(RejectedCommand::GearInPark),
        Gear::Drive if target < 0.0 => Err(RejectedCommand::DirectionMismatch { gear, target }),
        Gear::Reverse if target > 0.0 => Err(RejectedCommand::DirectionMismatch { gear, target }),
        _ => Ok(()),
    }
}

/// Applies an environment override. Out-of-range values are clamped.
pub fn apply_override(state: &mut VehicleState, o: EnvironmentOverride) {
    let perception = &mut state.perception;

    match o {
        EnvironmentOverride::FrontDistance(d) => perception.distance_front = d,
        EnvironmentOverride::BackDistance(d) => perception.distance_behind = d,
        EnvironmentOverride::SideObject(Some(side)) => perception.set_object(side, true),
        EnvironmentOverride::SideObject(None) => {
            perception.object_left = false;
            perception.object_right = false;
        }
        EnvironmentOverride::LightLevel(level) => {
            if level < 0.0 {
                debug!("light level {} clamped to 0", level);
            }
            perception.set_light_level(level);
        }
        EnvironmentOverride::Rain(rain) => perception.rain = rain,
        EnvironmentOverride::LaneWidth(width) => state.road.set_lane_width(width),
        EnvironmentOverride::MarkedRoad(marked) => state.road.set_marked(marked),
        EnvironmentOverride::RoadClass(class) => state.navigation.set_road_class(class),
        EnvironmentOverride::LaneCount(count) => {
            if count < 1 {
                debug!("lane count {} clamped to 1", count);
            }
            state.navigation.set_lane_count(count);
        }
        EnvironmentOverride::Reset => *perception = Perception::default(),
    }

    debug!("applied override {}", o);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alset_env::{RoadClass, Side, TurnSignal};

    fn state_with(gear: Gear, velocity: f64) -> VehicleState {
        let mut state = VehicleState::default();
        state.actuation.gear = gear;
        state.motion.velocity = velocity;
        state
    }

    #[test]
    fn test_brake_rejected_in_park() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Park, 0.0);
        let before = state.clone();

        let result = accept(&mut state, VehicleCommand::BrakeTo(0.0), &config);
        assert_eq!(result, Err(RejectedCommand::GearInPark));
        assert_eq!(state, before);
    }

    #[test]
    fn test_brake_target_above_velocity_rejected() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Drive, 0.0);

        let result = accept(&mut state, VehicleCommand::BrakeTo(10.0), &config);
        assert_eq!(
            result,
            Err(RejectedCommand::TargetExceedsVelocity {
                target: 10.0,
                velocity: 0.0,
            })
        );
        assert_eq!(state.intent, PendingIntent::None);
    }

    #[test]
    fn test_brake_in_reverse_is_direction_aware() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Reverse, -20.0);

        assert!(accept(&mut state, VehicleCommand::BrakeTo(-10.0), &config).is_ok());
        assert_eq!(state.intent, PendingIntent::Brake(-10.0));

        let result = accept(&mut state, VehicleCommand::BrakeTo(-30.0), &config);
        assert!(matches!(result, Err(RejectedCommand::TargetExceedsVelocity { .. })));

        let result = accept(&mut state, VehicleCommand::BrakeTo(5.0), &config);
        assert!(matches!(result, Err(RejectedCommand::DirectionMismatch { .. })));
    }

    #[test]
    fn test_accelerate_direction_checks() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Drive, 20.0);

        let result = accept(&mut state, VehicleCommand::AccelerateTo(-10.0), &config);
        assert_eq!(
            result,
            Err(RejectedCommand::DirectionMismatch {
                gear: Gear::Drive,
                target: -10.0,
            })
        );

        assert!(accept(&mut state, VehicleCommand::AccelerateTo(45.0), &config).is_ok());
        assert_eq!(state.intent, PendingIntent::Accelerate(45.0));
    }

    #[test]
    fn test_new_intent_replaces_old() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Drive, 50.0);

        accept(&mut state, VehicleCommand::AccelerateTo(70.0), &config).unwrap();
        accept(&mut state, VehicleCommand::BrakeTo(30.0), &config).unwrap();
        assert_eq!(state.intent, PendingIntent::Brake(30.0));
    }

    #[test]
    fn test_gear_change_needs_low_speed() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Drive, 30.0);

        let result = accept(&mut state, VehicleCommand::SetGear(Gear::Park), &config);
        assert_eq!(
            result,
            Err(RejectedCommand::GearChangeAtSpeed { velocity: 30.0 })
        );
        assert_eq!(state.actuation.gear, Gear::Drive);

        state.motion.velocity = 4.0;
        assert!(accept(&mut state, VehicleCommand::SetGear(Gear::Park), &config).is_ok());
        assert_eq!(state.actuation.gear, Gear::Park);
    }

    #[test]
    fn test_neutral_unavailable() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Park, 0.0);

        let result = accept(&mut state, VehicleCommand::SetGear(Gear::Neutral), &config);
        assert_eq!(result, Err(RejectedCommand::GearUnavailable(Gear::Neutral)));
    }

    #[test]
    fn test_vehicle_reset_restores_speed_and_route() {
        let config = VehicleConfig::default();
        let mut state = state_with(Gear::Drive, 12.0);
        state.navigation = Navigation::new(RoadClass::Local, 1, 1);
        state.actuation.turn_signal = TurnSignal::Left;

        accept(&mut state, VehicleCommand::Reset, &config).unwrap();
        assert_eq!(state.motion.velocity, 60.0);
        assert_eq!(state.navigation.road_class(), RoadClass::Highway);
        assert_eq!(state.navigation.current_lane(), 2);
        // Actuators are not part of the reset
        assert_eq!(state.actuation.turn_signal, TurnSignal::Left);
    }

    #[test]
    fn test_side_object_overrides() {
        let mut state = VehicleState::default();
        apply_override(&mut state, EnvironmentOverride::SideObject(Some(Side::Left)));
        apply_override(&mut state, EnvironmentOverride::SideObject(Some(Side::Right)));
        assert!(state.perception.object_left && state.perception.object_right);

        apply_override(&mut state, EnvironmentOverride::SideObject(None));
        assert!(!state.perception.object_left && !state.perception.object_right);
    }

    #[test]
    fn test_environment_reset() {
        let mut state = VehicleState::default();
        apply_override(&mut state, EnvironmentOverride::Rain(true));
        apply_override(&mut state, EnvironmentOverride::FrontDistance(12.0));
        apply_override(&mut state, EnvironmentOverride::Reset);
        assert_eq!(state.perception, Perception::default());
    }

    #[test]
    fn test_lane_count_override_clamps() {
        let mut state = VehicleState::default();
        apply_override(&mut state, EnvironmentOverride::LaneCount(0));
        assert_eq!(state.navigation.lane_count(), 1);
        assert_eq!(state.navigation.current_lane(), 1);
    }
}
