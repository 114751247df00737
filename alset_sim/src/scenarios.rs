//! Driving scenarios for the simulation harness.
//!
//! Each scenario is a starting configuration plus an input script. The
//! runner checks the per-tick invariants for all of them and the scenario's
//! own expectations once the script has played out.

use crate::script::ScriptedInput;
use alset_core::VehicleConfig;
use alset_env::{EnvironmentOverride, Gear, RoadClass, Side, TurnSignal, VehicleCommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// SIM-001: car cuts in ahead on the highway
    ObstacleApproach,

    /// SIM-002: high beams in the dark, dipped for traffic
    NightHighway,

    /// SIM-003: rain shower while accelerating
    RainCommute,

    /// SIM-004: lane change refused, then retried
    BlockedLaneChange,

    /// SIM-005: reversing out of a parking spot toward a car behind
    ReverseParking,

    /// SIM-006: brake to a stop, park, pull away
    StopAndGo,

    /// SIM-007: drifting over the lane markings
    LaneDeparture,

    /// SIM-008: seeded random overrides and commands
    SensorStorm,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::ObstacleApproach,
            ScenarioId::NightHighway,
            ScenarioId::RainCommute,
            ScenarioId::BlockedLaneChange,
            ScenarioId::ReverseParking,
            ScenarioId::StopAndGo,
            ScenarioId::LaneDeparture,
            ScenarioId::SensorStorm,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::ObstacleApproach => {
                "obstacle_approach"
            }
            ScenarioId::NightHighway => {
                "night_highway"
            }
            ScenarioId::RainCommute => "rain_commute",
            ScenarioId::BlockedLaneChange => {
                "blocked_lane_change"
            }
            ScenarioId::ReverseParking => "reverse_parking",
            ScenarioId::StopAndGo => "stop_and_go",
            ScenarioId::LaneDeparture => {
                "lane_departure"
            }
            ScenarioId::SensorStorm => "sensor_storm",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::ObstacleApproach => "Car 15 ahead at 60 mph, brake until clear",
            ScenarioId::NightHighway => "Dark open highway, dip for traffic, daylight returns",
            ScenarioId::RainCommute => "Rain turns on wipers and lights while accelerating to 70",
            ScenarioId::BlockedLaneChange => "Left change refused by a car alongside, then retried",
            ScenarioId::ReverseParking => "Reverse to 15 mph, hard stop for a car 12 behind, park",
            ScenarioId::StopAndGo => "Brake to 0, park, back to drive and accelerate to 40",
            ScenarioId::LaneDeparture => "Narrow lane crosses the markings, then unmarked roads",
            ScenarioId::SensorStorm => "Random overrides and commands from the seed",
        }
    }

    /// Vehicle state at session start.
    pub fn vehicle_config(&self) -> VehicleConfig {
        match self {
            ScenarioId::BlockedLaneChange => VehicleConfig {
                lane_count: 3,
                lane: 2,
                ..Default::default()
            },
            ScenarioId::ReverseParking => VehicleConfig::parked(),
            _ => VehicleConfig::default(),
        }
    }

    /// Ticks needed for the script to play out and settle.
    pub fn default_ticks(&self) -> u64 {
        match self {
            ScenarioId::ObstacleApproach => 20,
            ScenarioId::NightHighway => 15,
            ScenarioId::RainCommute => 12,
            ScenarioId::BlockedLaneChange => 8,
            ScenarioId::ReverseParking => 20,
            ScenarioId::StopAndGo => 60,
            ScenarioId::LaneDeparture => 12,
            ScenarioId::SensorStorm => 120,
        }
    }

    /// Builds the input script. Only `SensorStorm` depends on the seed.
    pub fn script(&self, seed: u64) -> ScriptedInput {
        use EnvironmentOverride as Env;
        use VehicleCommand as Cmd;

        match self {
            ScenarioId::ObstacleApproach => ScriptedInput::new().at(0, Env::FrontDistance(15.0)),
            ScenarioId::NightHighway => ScriptedInput::new()
                .at(0, Env::LightLevel(30.0))
                .at(5, Env::FrontDistance(80.0))
                .at(10, Env::LightLevel(250.0)),
            ScenarioId::RainCommute => ScriptedInput::new()
                .at(0, Env::Rain(true))
                .at(1, Cmd::AccelerateTo(70.0))
                .at(8, Env::Rain(false)),
            ScenarioId::BlockedLaneChange => ScriptedInput::new()
                .at(0, Env::SideObject(Some(Side::Left)))
                .at(1, Cmd::SetTurnSignal(TurnSignal::Left))
                .at(2, Env::SideObject(None))
                .at(3, Cmd::SetTurnSignal(TurnSignal::Left))
                .at(4, Cmd::SetTurnSignal(TurnSignal::Left)),
            ScenarioId::ReverseParking => ScriptedInput::new()
                .at(0, Cmd::SetGear(Gear::Reverse))
                .at(1, Cmd::AccelerateTo(-15.0))
                .at(5, Env::BackDistance(12.0))
                .at(14, Cmd::SetGear(Gear::Park)),
            ScenarioId::StopAndGo => ScriptedInput::new()
                .at(0, Cmd::BrakeTo(0.0))
                .at(30, Cmd::SetGear(Gear::Park))
                .at(32, Cmd::SetGear(Gear::Drive))
                .at(33, Cmd::AccelerateTo(40.0)),
            ScenarioId::LaneDeparture => ScriptedInput::new()
                .at(0, Env::LaneWidth(5.0))
                .at(3, Env::MarkedRoad(false))
                .at(5, Env::MarkedRoad(true))
                .at(6, Env::LaneWidth(12.0))
                .at(8, Env::RoadClass(RoadClass::Unregistered))
                .at(9, Env::LaneWidth(5.0)),
            ScenarioId::SensorStorm => storm_script(seed, self.default_ticks()),
        }
    }
}

/// Random inputs: roughly a third of ticks get an override, a quarter a
/// command.
fn storm_script(seed: u64, ticks: u64) -> ScriptedInput {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut script = ScriptedInput::new();

    for tick in 0..ticks {
        if rng.gen_bool(0.35) {
            script.push(tick, random_override(&mut rng));
        }
        if rng.gen_bool(0.25) {
            script.push(tick, random_command(&mut rng));
        }
    }
    script
}

fn random_side(rng: &mut ChaCha8Rng) -> Side {
    if rng.gen_bool(0.5) {
        Side::Left
    } else {
        Side::Right
    }
}

fn random_override(rng: &mut ChaCha8Rng) -> EnvironmentOverride {
    // Gaps cluster around the braking bands; some come out negative
    let z: f64 = rng.sample(StandardNormal);
    let gap = 50.0 + 45.0 * z;

    match rng.gen_range(0..10) {
        0 => EnvironmentOverride::FrontDistance(gap),
        1 => EnvironmentOverride::BackDistance(gap / 2.0),
        2 => EnvironmentOverride::SideObject(rng.gen_bool(0.7).then(|| random_side(rng))),
        3 => EnvironmentOverride::LightLevel(rng.gen_range(-20.0..300.0)),
        4 => EnvironmentOverride::Rain(rng.gen_bool(0.5)),
        5 => EnvironmentOverride::LaneWidth(rng.gen_range(4.0..14.0)),
        6 => EnvironmentOverride::MarkedRoad(rng.gen_bool(0.8)),
        7 => EnvironmentOverride::RoadClass(match rng.gen_range(0..3) {
            0 => RoadClass::Highway,
            1 => RoadClass::Local,
            _ => RoadClass::Unregistered,
        }),
        8 => EnvironmentOverride::LaneCount(rng.gen_range(-1..6)),
        _ => EnvironmentOverride::Reset,
    }
}

fn random_command(rng: &mut ChaCha8Rng) -> VehicleCommand {
    match rng.gen_range(0..9) {
        0 | 1 => VehicleCommand::BrakeTo(rng.gen_range(-30.0..80.0)),
        2 | 3 => VehicleCommand::AccelerateTo(rng.gen_range(-30.0..90.0)),
        4 | 5 => VehicleCommand::SetGear(match rng.gen_range(0..4) {
            0 => Gear::Park,
            1 => Gear::Reverse,
            2 => Gear::Neutral,
            _ => Gear::Drive,
        }),
        6 | 7 => VehicleCommand::SetTurnSignal(match rng.gen_range(0..3) {
            0 => TurnSignal::None,
            1 => TurnSignal::Left,
            _ => TurnSignal::Right,
        }),
        _ => VehicleCommand::Reset,
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "obstacle_approach" | "obstacle" | "sim-001" => Ok(ScenarioId::ObstacleApproach),
            "night_highway" | "night" | "sim-002" => Ok(ScenarioId::NightHighway),
            "rain_commute" | "rain" | "sim-003" => Ok(ScenarioId::RainCommute),
            "blocked_lane_change" | "blocked" | "sim-004" => Ok(ScenarioId::BlockedLaneChange),
            "reverse_parking" | "reverse" | "sim-005" => Ok(ScenarioId::ReverseParking),
            "stop_and_go" | "stop" | "sim-006" => Ok(ScenarioId::StopAndGo),
            "lane_departure" | "departure" | "sim-007" => Ok(ScenarioId::LaneDeparture),
            "sensor_storm" | "storm" | "sim-008" => Ok(ScenarioId::SensorStorm),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alset_env::InputSource;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
        assert_eq!("SIM-004".parse::<ScenarioId>(), Ok(ScenarioId::BlockedLaneChange));
        assert!("swarm".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_scripts_fit_in_default_ticks() {
        for scenario in ScenarioId::all() {
            let script = scenario.script(7);
            if let Some(last) = script.last_tick() {
                assert!(last < scenario.default_ticks(), "{}", scenario);
            }
        }
    }

    #[test]
    fn test_storm_is_seeded() {
        let a = ScenarioId::SensorStorm.script(42).entries();
        let b = ScenarioId::SensorStorm.script(42).entries();
        let c = ScenarioId::SensorStorm.script(43).entries();

        assert!(!a.is_empty());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fixed_scripts_ignore_seed() {
        let a = ScenarioId::StopAndGo.script(1).entries();
        let b = ScenarioId::StopAndGo.script(2).entries();
        assert_eq!(a, b);

        let mut script = ScenarioId::StopAndGo.script(1);
        assert_eq!(script.poll(0).command, Some(VehicleCommand::BrakeTo(0.0)));
    }
}
