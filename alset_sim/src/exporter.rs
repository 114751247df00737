//! JSON exporter for recorded runs.
//!
//! Exports every tick's dashboard snapshot plus the notable events of that
//! tick, for offline inspection or replay tooling.

use crate::error::SimError;
use alset_core::{ControlLoop, DisplaySnapshot, LaneChange};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Tick index (starting at 0)
    pub tick: u64,

    /// Simulation time in seconds when the tick ran
    pub time_sec: f64,

    /// Dashboard after the tick
    pub snapshot: DisplaySnapshot,

    /// Events (rejections, lane changes, braking)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<SimEvent>,
}

impl SimFrame {
    /// Captures the tick the control loop just ran.
    pub fn capture(control: &ControlLoop, snapshot: &DisplaySnapshot, time: Duration) -> Self {
        Self {
            tick: control.tick_count().saturating_sub(1),
            time_sec: time.as_secs_f64(),
            snapshot: snapshot.clone(),
            events: SimEvent::from_control(control),
        }
    }
}

/// Simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub level: Option<String>,
}

impl SimEvent {
    fn info(message: String) -> Self {
        Self { message, level: None }
    }

    fn warn(message: String) -> Self {
        Self {
            message,
            level: Some("warn".to_string()),
        }
    }

    /// Events of the last tick.
    pub fn from_control(control: &ControlLoop) -> Vec<SimEvent> {
        let events = control.last_events();
        let mut out = Vec::new();

        if let Some(rejection) = &events.rejection {
            out.push(SimEvent::warn(format!("command rejected: {}", rejection)));
        }
        if let Some(intensity) = events.obstacle_brake {
            out.push(SimEvent::info(format!("obstacle braking ({:?})", intensity)));
        }
        if events.intent_completed {
            out.push(SimEvent::info("speed target reached".to_string()));
        }
        match events.lane_change {
            LaneChange::Changed(side) => {
                out.push(SimEvent::info(format!("changed lane {:?}", side)))
            }
            LaneChange::Blocked(side) => {
                out.push(SimEvent::warn(format!("lane change {:?} blocked", side)))
            }
            LaneChange::NoLane(side) => {
                out.push(SimEvent::info(format!("no lane to the {:?}", side)))
            }
            LaneChange::Idle => {}
        }
        out
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alset_env::{EnvironmentOverride, VehicleCommand};

    #[test]
    fn test_capture_records_events() {
        let mut control = ControlLoop::default();
        control.state_mut().motion.velocity = 0.0;
        let snapshot = control.tick(
            Some(EnvironmentOverride::FrontDistance(50.0)),
            Some(VehicleCommand::BrakeTo(10.0)),
        );

        let frame = SimFrame::capture(&control, &snapshot, Duration::from_secs(2));

        assert_eq!(frame.tick, 0);
        assert_eq!(frame.time_sec, 2.0);
        assert_eq!(frame.events.len(), 1);
        assert_eq!(frame.events[0].level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_export_json_shape() {
        let mut control = ControlLoop::default();
        let snapshot = control.step();

        let mut export = SimExport::new("night_highway", 42);
        export.add_frame(SimFrame::capture(&control, &snapshot, Duration::ZERO));
        export.finalize(true, None);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["scenario"], "night_highway");
        assert_eq!(json["frames"][0]["snapshot"]["speed"], 60);
        assert!(json["frames"][0].get("events").is_none());
        assert!(json.get("failure_reason").is_none());
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join("alset_sim_export_test.json");
        let mut export = SimExport::new("stop_and_go", 1);
        export.finalize(false, Some("stalled".to_string()));

        export.write_to_file(&path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        let read: SimExport = serde_json::from_str(&json).unwrap();
        assert_eq!(read.failure_reason.as_deref(), Some("stalled"));
        let _ = std::fs::remove_file(&path);
    }
}
