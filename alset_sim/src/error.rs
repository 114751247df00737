//! Error types for the simulation harness.

use alset_env::EnvError;
use thiserror::Error;

/// Errors surfaced by scenario runs and the CLI.
#[derive(Debug, Error)]
pub enum SimError {
    /// Script loading or input plumbing failed
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Writing an export or building the runtime failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A per-tick invariant did not hold
    #[error("Invariant violated at tick {tick}: {reason}")]
    InvariantViolated { tick: u64, reason: String },
}
