//! Scenario runner - executes driving scenarios and checks their outcome.

use crate::error::SimError;
use crate::exporter::{SimExport, SimFrame};
use crate::pacer::SimPacer;
use crate::render;
use crate::scenarios::ScenarioId;
use crate::script::ScriptedInput;
use crate::world::{SimConfig, SimWorld};

use alset_core::{ControlLoop, DisplaySnapshot, Headlight, LaneChange, LaneWarning};
use alset_env::{Gear, TickPacer, TokioPacer, DEFAULT_TICK_INTERVAL};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// Recorded ticks. Every tick with `with_frames`, otherwise only the
    /// scenario's own length
    pub frames: Vec<SimFrame>,

    /// The last tick run
    pub last_frame: Option<SimFrame>,
}

impl ScenarioResult {
    /// Dashboard after the last tick.
    pub fn final_snapshot(&self) -> Option<&DisplaySnapshot> {
        self.last_frame.as_ref().map(|f| &f.snapshot)
    }

    /// Packages the run for JSON export.
    pub fn to_export(&self) -> SimExport {
        let mut export = SimExport::new(self.scenario.name(), self.seed);
        for frame in &self.frames {
            export.add_frame(frame.clone());
        }
        export.finalize(self.passed, self.failure_reason.clone());
        export
    }
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    /// Ticks recorded
    pub ticks: u64,

    /// Commands refused at acceptance
    pub rejections: u64,

    /// Lane changes carried out
    pub lane_changes: u64,

    /// Lane changes refused because of an object alongside
    pub blocked_lane_changes: u64,

    /// Ticks with obstacle braking
    pub obstacle_brake_ticks: u64,

    /// Speed targets reached
    pub intents_completed: u64,

    /// Highest velocity after any tick (mph)
    pub max_speed: f64,

    /// Lowest velocity after any tick (mph)
    pub min_speed: f64,
}

impl ScenarioMetrics {
    /// Records the tick the control loop just ran.
    pub fn record(&mut self, control: &ControlLoop) {
        let events = control.last_events();
        let velocity = control.state().motion.velocity;

        if self.ticks == 0 {
            self.max_speed = velocity;
            self.min_speed = velocity;
        } else {
            self.max_speed = self.max_speed.max(velocity);
            self.min_speed = self.min_speed.min(velocity);
        }
        self.ticks += 1;

        if events.rejection.is_some() {
            self.rejections += 1;
        }
        if events.obstacle_brake.is_some() {
            self.obstacle_brake_ticks += 1;
        }
        if events.intent_completed {
            self.intents_completed += 1;
        }
        match events.lane_change {
            LaneChange::Changed(_) => self.lane_changes += 1,
            LaneChange::Blocked(_) => self.blocked_lane_changes += 1,
            LaneChange::NoLane(_) | LaneChange::Idle => {}
        }
    }
}

/// Checks the invariants that must hold after every tick.
pub fn check_invariants(control: &ControlLoop, snapshot: &DisplaySnapshot) -> Result<(), String> {
    let velocity = control.state().motion.velocity;

    if snapshot.lane < 1 || snapshot.lane > snapshot.lane_count {
        return Err(format!("lane {} outside 1..={}", snapshot.lane, snapshot.lane_count));
    }
    if snapshot.gear != Gear::Drive && snapshot.cruise_control {
        return Err(format!("cruise control active in {}", snapshot.gear));
    }

    let consistent = match snapshot.gear {
        Gear::Park => velocity == 0.0,
        Gear::Drive => velocity >= 0.0,
        Gear::Reverse => velocity <= 0.0,
        Gear::Neutral => true,
    };
    if !consistent {
        return Err(format!("velocity {} in {}", velocity, snapshot.gear));
    }
    Ok(())
}

/// Frame history bounded to a number of leading ticks, plus the latest one.
struct FrameLog {
    history: u64,
    kept: Vec<SimFrame>,
    last: Option<SimFrame>,
}

impl FrameLog {
    fn new(history: u64) -> Self {
        Self {
            history,
            kept: Vec::new(),
            last: None,
        }
    }

    fn push(&mut self, frame: SimFrame) {
        if (self.kept.len() as u64) < self.history {
            self.kept.push(frame.clone());
        }
        self.last = Some(frame);
    }
}

/// Runs driving scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Tick count override
    ticks: Option<u64>,

    /// Script replacing the scenario's own
    script: Option<ScriptedInput>,

    /// Print the dashboard after every tick
    render: bool,

    /// Pace ticks in wall-clock time instead of virtual time
    realtime: Option<Duration>,

    /// Keep every frame for export
    keep_frames: bool,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ticks: None,
            script: None,
            render: false,
            realtime: None,
            keep_frames: false,
        }
    }

    /// Sets the number of ticks to run.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Replaces the scenario script. Scenario expectations are not checked.
    pub fn with_script(mut self, script: ScriptedInput) -> Self {
        self.script = Some(script);
        self
    }

    /// Prints the dashboard after every tick.
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Paces ticks on the tokio timer.
    pub fn with_realtime(mut self, interval: Duration) -> Self {
        self.realtime = Some(interval);
        self
    }

    /// Keeps every frame of the run, not just the scenario's own length.
    pub fn with_frames(mut self, keep: bool) -> Self {
        self.keep_frames = keep;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let ticks = self.ticks.unwrap_or_else(|| scenario.default_ticks());
        let script = self
            .script
            .clone()
            .unwrap_or_else(|| scenario.script(self.seed));
        let config = SimConfig {
            seed: self.seed,
            ticks,
            tick_interval: self.realtime.unwrap_or(DEFAULT_TICK_INTERVAL),
            vehicle: scenario.vehicle_config(),
        };

        let pacer: Box<dyn TickPacer> = match self.realtime {
            Some(interval) => Box::new(TokioPacer::new(interval)),
            None => Box::new(SimPacer::new(config.tick_interval)),
        };

        let checks_expectations = self.script.is_none() && ticks >= scenario.default_ticks();
        let history = match (self.keep_frames, checks_expectations) {
            (true, _) => u64::MAX,
            (false, true) => scenario.default_ticks(),
            (false, false) => 0,
        };

        let mut world = SimWorld::new(config, Box::new(script));
        let mut metrics = ScenarioMetrics::default();
        let mut frames = FrameLog::new(history);

        let outcome = self.drive(&mut world, pacer.as_ref(), |control, snapshot, time| {
            metrics.record(control);
            frames.push(SimFrame::capture(control, snapshot, time));

            if self.render {
                println!("{}", render::dashboard(snapshot));
            }

            check_invariants(control, snapshot).map_err(|reason| SimError::InvariantViolated {
                tick: control.tick_count() - 1,
                reason,
            })
        });

        let failure_reason = match outcome {
            Err(e) => Some(e.to_string()),
            Ok(_) if checks_expectations => verify(scenario, &frames, &metrics).err(),
            Ok(_) => None,
        };

        if let Some(reason) = &failure_reason {
            warn!("{} failed: {}", scenario.name(), reason);
        }
        debug!("{} metrics: {:?}", scenario.name(), metrics);

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_ticks: metrics.ticks,
            final_time_secs: frames.last.as_ref().map(|f| f.time_sec).unwrap_or(0.0),
            failure_reason,
            metrics,
            frames: frames.kept,
            last_frame: frames.last,
        }
    }

    fn drive<F>(
        &self,
        world: &mut SimWorld,
        pacer: &dyn TickPacer,
        on_tick: F,
    ) -> Result<u64, SimError>
    where
        F: FnMut(&ControlLoop, &DisplaySnapshot, Duration) -> Result<(), SimError>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        runtime.block_on(world.run_async(pacer, on_tick))
    }
}

fn frame(frames: &[SimFrame], tick: usize) -> Result<&DisplaySnapshot, String> {
    frames
        .get(tick)
        .map(|f| &f.snapshot)
        .ok_or_else(|| format!("tick {} was never run", tick))
}

fn ensure(condition: bool, what: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(what.to_string())
    }
}

/// Checks a scenario's own expectations after its script played out.
fn verify(
    scenario: ScenarioId,
    log: &FrameLog,
    metrics: &ScenarioMetrics,
) -> Result<(), String> {
    let frames = &log.kept;
    let last = log
        .last
        .as_ref()
        .map(|f| &f.snapshot)
        .ok_or_else(|| "no ticks were run".to_string())?;

    match scenario {
        ScenarioId::ObstacleApproach => {
            let first = frame(frames, 0)?;
            ensure(first.speed == 54 && first.cars_in_front, "firm braking on the first tick")?;
            ensure(metrics.obstacle_brake_ticks >= 2, "braking continued through the light band")?;
            ensure(last.speed > 0 && last.speed < 60, "slowed without stopping")?;
            ensure(!last.cars_in_front, "gap opened beyond detection range")
        }
        ScenarioId::NightHighway => {
            let open_road = frame(frames, 0)?;
            ensure(open_road.headlights == Headlight::High, "high beams on an open dark road")?;
            let traffic = frame(frames, 5)?;
            ensure(traffic.headlights == Headlight::Low, "high beams dipped for traffic")?;
            ensure(last.headlights == Headlight::Off, "headlights off in daylight")
        }
        ScenarioId::RainCommute => {
            ensure(frames.iter().take(8).all(|f| f.snapshot.wipers), "wipers on while raining")?;
            ensure(frame(frames, 0)?.headlights == Headlight::Low, "low beams in rain")?;
            ensure(frame(frames, 2)?.speed == 70, "reached 70 mph")?;
            ensure(
                !last.wipers && last.headlights == Headlight::Off,
                "wipers and lights off after rain",
            )?;
            ensure(metrics.intents_completed == 1, "one speed target reached")
        }
        ScenarioId::BlockedLaneChange => {
            let blocked = frame(frames, 1)?;
            ensure(blocked.lane == 2, "lane kept while blocked")?;
            ensure(blocked.lane_warning == LaneWarning::Left, "left warning when blocked")?;
            ensure(frame(frames, 3)?.lane == 1, "changed lane once clear")?;
            ensure(last.lane == 1, "no lane beyond the leftmost")?;
            ensure(
                metrics.lane_changes == 1 && metrics.blocked_lane_changes == 1,
                "one change and one refusal",
            )
        }
        ScenarioId::ReverseParking => {
            ensure(frame(frames, 0)?.gear == Gear::Reverse, "shifted into reverse")?;
            ensure(frames.iter().any(|f| f.snapshot.rear_camera), "rear camera shown")?;
            ensure(metrics.min_speed <= -15.0, "reversed at 15 mph")?;
            ensure(metrics.obstacle_brake_ticks >= 1, "braked for the car behind")?;
            ensure(last.gear == Gear::Park && last.speed == 0, "parked")
        }
        ScenarioId::StopAndGo => {
            ensure(
                frames.iter().any(|f| f.snapshot.gear == Gear::Park && f.snapshot.speed == 0),
                "stopped and parked",
            )?;
            ensure(last.gear == Gear::Drive && last.speed == 40, "pulled away to 40 mph")?;
            ensure(last.cruise_control, "cruise control resumed on the highway")?;
            ensure(metrics.intents_completed == 2, "both speed targets reached")
        }
        ScenarioId::LaneDeparture => {
            let narrow = frame(frames, 0)?;
            ensure(narrow.lane_warning == LaneWarning::Right, "right line crossed")?;
            ensure(narrow.lane_width == Some(7.0), "lane width clamped to 7")?;
            let unmarked = frame(frames, 3)?;
            ensure(
                unmarked.lane_warning == LaneWarning::None && unmarked.lane_width.is_none(),
                "no warning on an unmarked road",
            )?;
            let remarked = frame(frames, 5)?;
            ensure(remarked.lane_warning == LaneWarning::Right, "warning with markings back")?;
            let wide = frame(frames, 6)?;
            ensure(wide.lane_warning == LaneWarning::None, "wide lane clears warning")?;
            ensure(last.lane_warning == LaneWarning::None, "no warning off registered roads")
        }
        ScenarioId::SensorStorm => ensure(
            metrics.ticks >= scenario.default_ticks(),
            "every tick recorded",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alset_env::{EnvironmentOverride, VehicleCommand};
    use proptest::prelude::*;

    #[test]
    fn test_all_scenarios_pass() {
        let runner = ScenarioRunner::new(42);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
            assert_eq!(result.total_ticks, scenario.default_ticks());
        }
    }

    #[test]
    fn test_virtual_time_follows_ticks() {
        let result = ScenarioRunner::new(1).run(ScenarioId::RainCommute);
        // First tick at t=0, one interval between ticks
        let expected = (result.total_ticks - 1) as f64 * DEFAULT_TICK_INTERVAL.as_secs_f64();
        assert_eq!(result.final_time_secs, expected);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let a = ScenarioRunner::new(9).run(ScenarioId::SensorStorm);
        let b = ScenarioRunner::new(9).run(ScenarioId::SensorStorm);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.final_snapshot(), b.final_snapshot());
    }

    #[test]
    fn test_custom_script_skips_expectations() {
        let script = ScriptedInput::new().at(0, EnvironmentOverride::Rain(true));
        let result = ScenarioRunner::new(42)
            .with_script(script)
            .run(ScenarioId::NightHighway);

        assert!(result.passed);
        assert!(result.final_snapshot().is_some_and(|s| s.wipers));
    }

    #[test]
    fn test_short_run_skips_expectations() {
        let result = ScenarioRunner::new(42).with_ticks(3).run(ScenarioId::StopAndGo);
        assert!(result.passed);
        assert_eq!(result.total_ticks, 3);
    }

    #[test]
    fn test_metrics_count_events() {
        let script = ScriptedInput::new()
            .at(0, VehicleCommand::SetGear(alset_env::Gear::Park))
            .at(1, VehicleCommand::BrakeTo(80.0));
        let result = ScenarioRunner::new(42)
            .with_script(script)
            .run(ScenarioId::ObstacleApproach);

        assert_eq!(result.metrics.rejections, 2);
        assert_eq!(result.metrics.max_speed, 60.0);
    }

    #[test]
    fn test_long_scripted_run_keeps_only_last_frame() {
        let script = ScriptedInput::new().at(0, EnvironmentOverride::Rain(true));
        let result = ScenarioRunner::new(1)
            .with_ticks(500)
            .with_script(script)
            .run(ScenarioId::NightHighway);

        assert!(result.passed);
        assert_eq!(result.total_ticks, 500);
        assert!(result.frames.is_empty());
        assert_eq!(result.last_frame.as_ref().map(|f| f.tick), Some(499));
    }

    #[test]
    fn test_unbounded_frame_log_does_not_preallocate() {
        let control = ControlLoop::default();
        let frame = SimFrame::capture(&control, &control.snapshot(), Duration::ZERO);

        let mut log = FrameLog::new(u64::MAX);
        assert_eq!(log.kept.capacity(), 0);
        log.push(frame.clone());
        log.push(frame);
        assert_eq!(log.kept.len(), 2);
        assert!(log.last.is_some());
    }

    #[test]
    fn test_expectations_keep_scenario_length() {
        let result = ScenarioRunner::new(42)
            .with_ticks(40)
            .run(ScenarioId::BlockedLaneChange);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.frames.len() as u64, ScenarioId::BlockedLaneChange.default_ticks());
        assert_eq!(result.total_ticks, 40);
    }

    #[test]
    fn test_export_carries_frames() {
        let result = ScenarioRunner::new(42)
            .with_frames(true)
            .run(ScenarioId::BlockedLaneChange);
        let export = result.to_export();

        assert_eq!(export.frames.len() as u64, result.total_ticks);
        assert!(export.passed);
        assert!(export.frames[1]
            .events
            .iter()
            .any(|e| e.message.contains("blocked")));
    }

    #[test]
    fn test_invariant_check_flags_cruise_outside_drive() {
        let mut control = ControlLoop::default();
        control.state_mut().actuation.gear = Gear::Neutral;
        let snapshot = control.snapshot();

        assert!(check_invariants(&control, &snapshot).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_sensor_storm_holds_invariants(seed in any::<u64>()) {
            let result = ScenarioRunner::new(seed).run(ScenarioId::SensorStorm);
            prop_assert!(result.passed, "seed {}: {:?}", seed, result.failure_reason);
        }
    }
}
