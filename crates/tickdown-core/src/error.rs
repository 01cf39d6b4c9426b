//! Core error types for tickdown-core.
//!
//! This module defines the error hierarchy using thiserror. No error
//! here is fatal to the process: every operation fails at its own
//! boundary and leaves the in-memory store consistent.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tickdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rejected timer transitions
    #[error("{0}")]
    Transition(#[from] TransitionError),

    /// The operation needs an explicit go-ahead from the caller
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(Confirmation),

    /// No task with the given id exists in any bucket
    #[error("No task with id {id}")]
    UnknownTask { id: String },

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A precondition that needs the caller's explicit go-ahead.
///
/// Returned as data instead of prompting so every frontend can ask in
/// its own way, or pass a standing approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Another task is running; starting this one stops it and discards
    /// its remaining time.
    StopRunning {
        running_id: String,
        running_name: String,
    },

    /// The task to delete is currently running.
    DeleteRunning { id: String, name: String },
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confirmation::StopRunning { running_name, .. } => {
                write!(f, "'{running_name}' is running and will be stopped")
            }
            Confirmation::DeleteRunning { name, .. } => {
                write!(f, "'{name}' is currently running")
            }
        }
    }
}

/// Rejected per-task timer transitions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The task was created without a countdown
    #[error("Task has no timer")]
    NoTimer,

    /// Start requested while the timer is already running
    #[error("Timer is already running")]
    AlreadyRunning,

    /// Stop requested while the timer is not running
    #[error("Timer is not running")]
    NotRunning,

    /// Start requested on a completed task
    #[error("Task is already completed")]
    Completed,
}

/// Validation errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Task names are trimmed and must be non-empty
    #[error("Task name must not be empty")]
    EmptyTaskName,

    /// User names are trimmed and must be non-empty
    #[error("User name must not be empty")]
    EmptyUserName,

    /// Minutes and seconds that overflow, or total more than the
    /// longest countdown a deadline can represent
    #[error("Duration too long (at most {max} seconds)", max = crate::task::MAX_DURATION_SECS)]
    DurationTooLong,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to create the data directory
    #[error("Failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// The data directory could not be resolved
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Alert playback failure.
///
/// Playback runs after the expiry is already committed, so this is
/// surfaced as a warning at most and never rolls back task state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Audio playback failed: {0}")]
pub struct PlaybackError(pub String);

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
