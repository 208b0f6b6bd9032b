use thiserror::Error;

use crate::identity::ActorId;

/// Protocol-wide error types for the Chronos reputation engine.
///
/// The per-step pipeline is made of total functions; these variants surface
/// only from constructors, validators, and probability-transform utilities.
#[derive(Debug, Error)]
pub enum ChronosError {
    /// A scaling parameter was out of its admissible range (e.g. temperature <= 0).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration rejected at load or validation time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The actor was never registered with the engine.
    #[error("Unknown actor: {0}")]
    UnknownActor(ActorId),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error while reading configuration or writing snapshots.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for ChronosError {
    fn from(e: serde_json::Error) -> Self {
        ChronosError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for ChronosError {
    fn from(e: std::io::Error) -> Self {
        ChronosError::Io(e.to_string())
    }
}
