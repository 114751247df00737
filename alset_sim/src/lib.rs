//! Alset Simulation Harness
//!
//! Runs the vehicle controller through scripted driving scenarios, on a
//! virtual clock by default or paced in real time.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                     SimWorld                       │
//! │  ┌───────────────┐  poll   ┌────────────────────┐  │
//! │  │ ScriptedInput │────────►│    ControlLoop     │  │
//! │  │ (InputSource) │  once   │  (alset_core tick) │  │
//! │  └───────────────┘ per tick└─────────┬──────────┘  │
//! │                                      │ snapshot    │
//! │  ┌───────────────┐          ┌────────▼──────────┐  │
//! │  │   TickPacer   │          │ invariants,       │  │
//! │  │ Sim / Tokio   │          │ metrics, export   │  │
//! │  └───────────────┘          └───────────────────┘  │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use alset_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::StopAndGo);
//! assert!(result.passed);
//! ```

mod error;
mod exporter;
mod pacer;
pub mod render;
mod runner;
pub mod scenarios;
mod script;
mod world;

pub use error::SimError;
pub use exporter::{SimEvent, SimExport, SimFrame};
pub use pacer::SimPacer;
pub use runner::{check_invariants, ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use script::{ScriptEntry, ScriptedInput};
pub use world::{SimConfig, SimWorld};
