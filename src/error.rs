// src/error.rs
use thiserror::Error;

use crate::actions::Action;

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("Action {action} failed: {reason}")]
    Executor { action: Action, reason: String },

    #[error("Action {0} is not supported by the {1} executor")]
    Unsupported(Action, &'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Result type alias for engine operations.
pub type GestureResult<T> = Result<T, GestureError>;
