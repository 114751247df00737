//! Alset Simulator CLI
//!
//! Run the vehicle controller through driving scenarios.

use alset_sim::scenarios::ScenarioId;
use alset_sim::{ScenarioResult, ScenarioRunner, ScriptedInput};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Alset vehicle simulation CLI
#[derive(Parser, Debug)]
#[command(name = "alset-sim")]
#[command(about = "Run driving scenarios against the Alset vehicle controller", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (obstacle_approach, night_highway, rain_commute,
    /// blocked_lane_change, reverse_parking, stop_and_go, lane_departure,
    /// sensor_storm, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Ticks to run (defaults to each scenario's own length)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// JSON input script replacing the scenario's own
    #[arg(long)]
    script: Option<String>,

    /// Export the run to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Print the dashboard after every tick
    #[arg(long)]
    render: bool,

    /// Pace ticks in real time, in milliseconds between ticks
    #[arg(long, num_args = 0..=1, default_missing_value = "2000")]
    realtime: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Alset Simulator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {}", e);
                let names: Vec<_> = ScenarioId::all().iter().map(|s| s.name()).collect();
                eprintln!("Available scenarios: {}, all", names.join(", "));
                std::process::exit(2);
            }
        }
    };

    if args.export.is_some() && (scenarios.len() > 1 || args.seeds > 1) {
        eprintln!("Error: --export only supports a single scenario and seed");
        std::process::exit(2);
    }

    let script = match &args.script {
        Some(path) => match ScriptedInput::load(path) {
            Ok(script) => {
                info!("Loaded {} scripted events from {}", script.remaining(), path);
                Some(script)
            }
            Err(e) => {
                eprintln!("Error: failed to load script {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => None,
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    // Run simulations
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let mut runner = ScenarioRunner::new(seed)
            .with_render(args.render)
            .with_frames(args.export.is_some());
        if let Some(ticks) = args.ticks {
            runner = runner.with_ticks(ticks);
        }
        if let Some(script) = &script {
            runner = runner.with_script(script.clone());
        }
        if let Some(ms) = args.realtime {
            runner = runner.with_realtime(Duration::from_millis(ms));
        }

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Handle --export
    if let (Some(path), Some(result)) = (&args.export, all_results.first()) {
        match result.to_export().write_to_file(path) {
            Ok(()) => info!("Exported {} frames to {}", result.frames.len(), path),
            Err(e) => {
                error!("Failed to write export: {}", e);
                std::process::exit(2);
            }
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "failure_reason": r.failure_reason,
                    "metrics": r.metrics,
                    "final": r.final_snapshot(),
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: failed to encode summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            // List failed seeds
            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
