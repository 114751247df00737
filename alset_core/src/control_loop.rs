//! Control Loop - one deterministic tick of the vehicle controller.
//!
//! # Tick
//!
//! ```text
//! inputs ──► apply override ──► accept command
//!                                     │
//!   ┌─────────────────────────────────▼──────────────────────────┐
//!   │ 1 obstacle braking   2 pending accel   3 pending brake     │
//!   │ 4 headlights         5 lane change     6 high beams        │
//!   │ 7 wipers             8 gear consistency                    │
//!   └─────────────────────────────────┬──────────────────────────┘
//!                                     ▼
//!                              DisplaySnapshot
//! ```
//!
//! The loop is the sole owner of the vehicle state. Ticks never fail:
//! invalid commands are refused at acceptance and out-of-range values are
//! clamped.

use crate::actuation::BrakeIntensity;
use crate::commands;
use crate::config::VehicleConfig;
use crate::display::DisplaySnapshot;
use crate::error::RejectedCommand;
use crate::policies::{self, LaneChange};
use crate::state::VehicleState;
use alset_env::{EnvironmentOverride, TickInputs, VehicleCommand};
use tracing::{trace, warn};

/// What happened during the last tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Command refused this tick, if any
    pub rejection: Option<RejectedCommand>,

    /// Obstacle braking applied this tick
    pub obstacle_brake: Option<BrakeIntensity>,

    /// A pending speed target was reached this tick
    pub intent_completed: bool,

    /// Outcome of the lane-change policy
    pub lane_change: LaneChange,
}

/// The vehicle controller.
pub struct ControlLoop {
    /// Session-start configuration (also the vehicle reset target)
    config: VehicleConfig,

    /// All vehicle state
    state: VehicleState,

    /// Completed ticks
    tick_count: u64,

    /// Events of the most recent tick
    last_events: TickEvents,
}

impl ControlLoop {
    /// Creates a controller in the session-start state described by `config`.
    pub fn new(config: VehicleConfig) -> Self {
        let state = VehicleState::from_config(&config);
        Self {
            config,
            state,
            tick_count: 0,
            last_events: TickEvents::default(),
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Mutable access for scenario setup between ticks.
    pub fn state_mut(&mut self) -> &mut VehicleState {
        &mut self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_events(&self) -> &TickEvents {
        &self.last_events
    }

    pub fn last_rejection(&self) -> Option<&RejectedCommand> {
        self.last_events.rejection.as_ref()
    }

    /// Validates and applies a vehicle command.
    pub fn submit(&mut self, command: VehicleCommand) -> Result<(), RejectedCommand> {
        commands::accept(&mut self.state, command, &self.config)
    }

    /// Applies an environment override.
    pub fn apply_override(&mut self, o: EnvironmentOverride) {
        commands::apply_override(&mut self.state, o);
    }

    /// Runs one tick.
    ///
    /// The override and the command (if any) are applied before the
    /// policies. A rejected command is logged and kept in
    /// [`last_rejection`](Self::last_rejection); the tick still runs.
    pub fn tick(
        &mut self,
        environment: Option<EnvironmentOverride>,
        command: Option<VehicleCommand>,
    ) -> DisplaySnapshot {
        let mut events = TickEvents::default();
        self.state.blocked_lane_change = None;

        if let Some(o) = environment {
            self.apply_override(o);
        }
        if let Some(command) = command {
            if let Err(rejection) = self.submit(command) {
                warn!("tick {}: rejected {}: {}", self.tick_count, command, rejection);
                events.rejection = Some(rejection);
            }
        }

        self.run_policies(&mut events);

        self.tick_count += 1;
        self.last_events = events;
        self.snapshot()
    }

    /// Runs one tick with inputs polled from an input source.
    pub fn tick_with(&mut self, inputs: TickInputs) -> DisplaySnapshot {
        self.tick(inputs.environment, inputs.command)
    }

    /// Runs one tick without input.
    pub fn step(&mut self) -> DisplaySnapshot {
        self.tick(None, None)
    }

    /// Projects the current state without ticking.
    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot::project(&self.state)
    }

    fn run_policies(&mut self, events: &mut TickEvents) {
        let state = &mut self.state;

        events.obstacle_brake = policies::obstacle_braking(state);
        events.intent_completed |= policies::pending_acceleration(state);
        events.intent_completed |= policies::pending_braking(state);
        policies::headlights(&state.perception, &mut state.actuation);

        events.lane_change = policies::lane_change(
            &state.motion,
            &mut state.navigation,
            &mut state.perception,
            &mut state.actuation,
        );
        if let LaneChange::Blocked(side) = events.lane_change {
            state.blocked_lane_change = Some(side);
        }

        policies::high_beams(&state.motion, &state.perception, &mut state.actuation);
        policies::wipers(&state.perception, &mut state.actuation);
        policies::gear_consistency(&mut state.motion, &state.navigation, &mut state.actuation);

        trace!(
            "tick {}: velocity={:.2} gear={} lane={}",
            self.tick_count,
            state.motion.velocity,
            state.actuation.gear,
            state.navigation.current_lane()
        );
    }
}

impl Default for ControlLoop {
    fn default() -> Self {
        Self::new(VehicleConfig::default())
    }
}
