//! Error types.

use thiserror::Error;

use crate::core::LightId;

/// Errors returned by the traffic light API.
#[derive(Debug, Error)]
pub enum Error {
    /// `simulate` was called on a light whose cycle thread is already running.
    #[error("traffic light {0} is already simulating")]
    AlreadySimulating(LightId),

    /// The light has been stopped, either directly or through its shutdown signal.
    #[error("traffic light {0} has been stopped")]
    Stopped(LightId),

    /// The operating system refused to start the cycle thread.
    #[error("failed to spawn phase cycle thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A cycle configuration did not pass validation.
    #[error("invalid cycle configuration: {0}")]
    InvalidConfig(String),

    /// A cycle configuration could not be parsed.
    #[error("failed to parse cycle configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
