//! Tick-indexed input scripts.
//!
//! A script schedules input events at tick numbers. Events due at a tick
//! join a FIFO backlog, and each tick takes at most one event per input
//! class from it, exactly like the live channel input.
//!
//! # JSON format
//!
//! ```json
//! [
//!   { "tick": 0, "event": { "environment": { "kind": "front_distance", "value": 15.0 } } },
//!   { "tick": 2, "event": { "vehicle": { "kind": "set_gear", "value": "park" } } }
//! ]
//! ```

use alset_env::{EnvError, InputEvent, InputSource, TickInputs};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

/// One scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub tick: u64,
    pub event: InputEvent,
}

/// Scripted input source.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    /// Events not yet due, by tick
    scheduled: BTreeMap<u64, Vec<InputEvent>>,

    /// Events due but not yet taken
    backlog: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `event` at `tick` (builder form).
    pub fn at(mut self, tick: u64, event: impl Into<InputEvent>) -> Self {
        self.push(tick, event);
        self
    }

    /// Schedules `event` at `tick`. Events at the same tick keep their order.
    pub fn push(&mut self, tick: u64, event: impl Into<InputEvent>) {
        self.scheduled.entry(tick).or_default().push(event.into());
    }

    /// Number of events not yet handed out.
    pub fn remaining(&self) -> usize {
        self.backlog.len() + self.scheduled.values().map(Vec::len).sum::<usize>()
    }

    /// Tick of the last scheduled event, if any remain scheduled.
    pub fn last_tick(&self) -> Option<u64> {
        self.scheduled.keys().next_back().copied()
    }

    /// Returns the scheduled events in tick order.
    pub fn entries(&self) -> Vec<ScriptEntry> {
        self.scheduled
            .iter()
            .flat_map(|(&tick, events)| {
                events
                    .iter()
                    .map(move |&event| ScriptEntry { tick, event })
            })
            .collect()
    }

    /// Parses a script from JSON.
    pub fn from_json(json: &str) -> Result<Self, EnvError> {
        let entries: Vec<ScriptEntry> = serde_json::from_str(json)?;
        if entries.is_empty() {
            return Err(EnvError::script("script contains no events"));
        }

        let mut script = Self::new();
        for entry in entries {
            script.push(entry.tick, entry.event);
        }
        Ok(script)
    }

    /// Loads a script from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the scheduled events to JSON.
    pub fn to_json(&self) -> Result<String, EnvError> {
        Ok(serde_json::to_string_pretty(&self.entries())?)
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> TickInputs {
        let later = self.scheduled.split_off(&(tick + 1));
        let due = std::mem::replace(&mut self.scheduled, later);
        self.backlog.extend(due.into_values().flatten());

        TickInputs::take_from(&mut self.backlog)
    }

    fn is_exhausted(&self) -> bool {
        self.scheduled.is_empty() && self.backlog.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alset_env::{EnvironmentOverride, Gear, VehicleCommand};

    #[test]
    fn test_events_fire_at_their_tick() {
        let mut script = ScriptedInput::new()
            .at(2, EnvironmentOverride::Rain(true))
            .at(3, VehicleCommand::SetGear(Gear::Park));

        assert!(script.poll(0).is_empty());
        assert!(script.poll(1).is_empty());
        assert_eq!(script.poll(2).environment, Some(EnvironmentOverride::Rain(true)));
        assert_eq!(script.poll(3).command, Some(VehicleCommand::SetGear(Gear::Park)));
        assert!(script.is_exhausted());
    }

    #[test]
    fn test_same_class_spills_into_later_ticks() {
        let mut script = ScriptedInput::new()
            .at(0, EnvironmentOverride::Rain(true))
            .at(0, EnvironmentOverride::LightLevel(30.0))
            .at(0, VehicleCommand::BrakeTo(40.0));

        let first = script.poll(0);
        assert_eq!(first.environment, Some(EnvironmentOverride::Rain(true)));
        assert_eq!(first.command, Some(VehicleCommand::BrakeTo(40.0)));

        let second = script.poll(1);
        assert_eq!(second.environment, Some(EnvironmentOverride::LightLevel(30.0)));
        assert_eq!(second.command, None);
        assert!(script.is_exhausted());
    }

    #[test]
    fn test_skipped_ticks_keep_order() {
        let mut script = ScriptedInput::new()
            .at(1, EnvironmentOverride::FrontDistance(50.0))
            .at(2, EnvironmentOverride::FrontDistance(40.0));

        // Polling jumps straight to tick 5: both are due, oldest first
        assert_eq!(
            script.poll(5).environment,
            Some(EnvironmentOverride::FrontDistance(50.0))
        );
        assert_eq!(
            script.poll(6).environment,
            Some(EnvironmentOverride::FrontDistance(40.0))
        );
    }

    #[test]
    fn test_json_script() {
        let json = r#"[
            { "tick": 0, "event": { "environment": { "kind": "front_distance", "value": 15.0 } } },
            { "tick": 2, "event": { "vehicle": { "kind": "set_gear", "value": "park" } } },
            { "tick": 2, "event": { "environment": { "kind": "side_object", "value": "left" } } }
        ]"#;

        let script = ScriptedInput::from_json(json).unwrap();
        assert_eq!(script.remaining(), 3);
        assert_eq!(script.last_tick(), Some(2));

        let reparsed = ScriptedInput::from_json(&script.to_json().unwrap()).unwrap();
        assert_eq!(reparsed.entries(), script.entries());
    }

    #[test]
    fn test_empty_script_rejected() {
        let result = ScriptedInput::from_json("[]");
        assert!(matches!(result, Err(EnvError::Script(_))));

        let result = ScriptedInput::from_json("{ not json");
        assert!(matches!(result, Err(EnvError::Serialization(_))));
    }
}
