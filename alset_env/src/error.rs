//! Error types for the Alset environment abstraction.

use thiserror::Error;

/// Errors that can occur in the input plumbing around the control core.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Every sender for the input queue has been dropped
    #[error("Input queue closed")]
    QueueClosed,

    /// An input script is malformed
    #[error("Script error: {0}")]
    Script(String),

    /// Reading a script or writing an export failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Script or export (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EnvError {
    /// Creates a script error.
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}
