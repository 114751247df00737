//! Common types for the Alset environment abstraction.
//!
//! These are the values that cross the boundary between the control core and
//! whatever drives it (an operator console, a script, a test).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Transmission gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gear {
    Park,
    Reverse,
    Neutral,
    Drive,
}

impl Gear {
    /// Returns the gear name.
    pub fn name(&self) -> &'static str {
        match self {
            Gear::Park => "park",
            Gear::Reverse => "reverse",
            Gear::Neutral => "neutral",
            Gear::Drive => "drive",
        }
    }

    /// Returns true for gears that move the vehicle forward (or let it roll).
    pub fn is_forward(&self) -> bool {
        matches!(self, Gear::Drive | Gear::Neutral)
    }
}

impl std::fmt::Display for Gear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Gear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "p" | "park" | "0" => Ok(Gear::Park),
            "r" | "reverse" | "1" => Ok(Gear::Reverse),
            "n" | "neutral" | "2" => Ok(Gear::Neutral),
            "d" | "drive" | "3" => Ok(Gear::Drive),
            _ => Err(format!("Unknown gear: {}", s)),
        }
    }
}

/// Side of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Turn signal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSignal {
    #[default]
    None,
    Left,
    Right,
}

impl TurnSignal {
    /// Returns the side the signal points to, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            TurnSignal::None => None,
            TurnSignal::Left => Some(Side::Left),
            TurnSignal::Right => Some(Side::Right),
        }
    }
}

/// Classification of the road the vehicle is on.
///
/// Exactly one class applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Highway,
    Local,
    Unregistered,
}

impl RoadClass {
    /// Returns true if the road is known to the navigation system.
    pub fn is_registered(&self) -> bool {
        !matches!(self, RoadClass::Unregistered)
    }
}

impl std::fmt::Display for RoadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoadClass::Highway => "highway",
            RoadClass::Local => "local",
            RoadClass::Unregistered => "unregistered",
        };
        write!(f, "{}", name)
    }
}

/// An operator-injected change to what the vehicle senses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EnvironmentOverride {
    /// Distance to the car in front
    FrontDistance(f64),

    /// Distance to the car behind
    BackDistance(f64),

    /// `Some(side)` marks that side occupied, `None` clears both sides
    SideObject(Option<Side>),

    /// Ambient light level (negative values clamp to 0)
    LightLevel(f64),

    /// Rain on or off
    Rain(bool),

    /// Lane width reported by the scanners (ignored on unmarked roads)
    LaneWidth(f64),

    /// Whether the current road has lane markings
    MarkedRoad(bool),

    /// Road classification from navigation
    RoadClass(RoadClass),

    /// Number of lanes on the current road (values below 1 clamp to 1)
    LaneCount(i64),

    /// Restore default perception
    Reset,
}

impl std::fmt::Display for EnvironmentOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentOverride::FrontDistance(d) => write!(f, "front_distance={}", d),
            EnvironmentOverride::BackDistance(d) => write!(f, "back_distance={}", d),
            EnvironmentOverride::SideObject(side) => write!(f, "side_object={:?}", side),
            EnvironmentOverride::LightLevel(l) => write!(f, "light_level={}", l),
            EnvironmentOverride::Rain(r) => write!(f, "rain={}", r),
            EnvironmentOverride::LaneWidth(w) => write!(f, "lane_width={}", w),
            EnvironmentOverride::MarkedRoad(m) => write!(f, "marked_road={}", m),
            EnvironmentOverride::RoadClass(c) => write!(f, "road_class={}", c),
            EnvironmentOverride::LaneCount(n) => write!(f, "lane_count={}", n),
            EnvironmentOverride::Reset => write!(f, "reset"),
        }
    }
}

/// An operator command to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VehicleCommand {
    /// Brake down to the given speed (mph)
    BrakeTo(f64),

    /// Accelerate up to the given speed (mph, negative in reverse)
    AccelerateTo(f64),

    /// Shift gear
    SetGear(Gear),

    /// Request a lane change, or cancel with `TurnSignal::None`
    SetTurnSignal(TurnSignal),

    /// Restore initial speed and route
    Reset,
}

impl std::fmt::Display for VehicleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleCommand::BrakeTo(s) => write!(f, "brake_to({})", s),
            VehicleCommand::AccelerateTo(s) => write!(f, "accelerate_to({})", s),
            VehicleCommand::SetGear(g) => write!(f, "set_gear({})", g),
            VehicleCommand::SetTurnSignal(t) => write!(f, "set_turn_signal({:?})", t),
            VehicleCommand::Reset => write!(f, "reset"),
        }
    }
}

/// A single queued input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Environment(EnvironmentOverride),
    Vehicle(VehicleCommand),
}

impl From<EnvironmentOverride> for InputEvent {
    fn from(o: EnvironmentOverride) -> Self {
        InputEvent::Environment(o)
    }
}

impl From<VehicleCommand> for InputEvent {
    fn from(c: VehicleCommand) -> Self {
        InputEvent::Vehicle(c)
    }
}

/// The inputs applied before one tick's policies run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInputs {
    pub environment: Option<EnvironmentOverride>,
    pub command: Option<VehicleCommand>,
}

impl TickInputs {
    /// Returns true if nothing is pending for this tick.
    pub fn is_empty(&self) -> bool {
        self.environment.is_none() && self.command.is_none()
    }

    /// Places an event in its class slot.
    ///
    /// Returns the event back if that slot is already taken.
    pub fn offer(&mut self, event: InputEvent) -> Result<(), InputEvent> {
        match event {
            InputEvent::Environment(o) if self.environment.is_none() => {
                self.environment = Some(o);
                Ok(())
            }
            InputEvent::Vehicle(c) if self.command.is_none() => {
                self.command = Some(c);
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Takes the first event of each class from `queue`.
    ///
    /// Events that do not fit stay in the queue in their original order.
    pub fn take_from(queue: &mut VecDeque<InputEvent>) -> Self {
        let mut inputs = TickInputs::default();
        let mut deferred = VecDeque::with_capacity(queue.len());

        while let Some(event) = queue.pop_front() {
            if let Err(event) = inputs.offer(event) {
                deferred.push_back(event);
            }
        }

        *queue = deferred;
        inputs
    }
}
