//! Core error types for vibetimer-core.
//!
//! Timer operations that are only valid from a particular state return a
//! [`TimerError`]; configuration loading and editing return a
//! [`ConfigError`]. Both roll up into [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerMode;

/// Core error type for vibetimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer operation rejected in the current state
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Operations the engine refuses to perform from the current state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// `stop_vibing` called outside of a vibing session
    #[error("cannot stop vibing while in {mode} mode")]
    NotVibing { mode: TimerMode },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
