//! Core error types for levelup-core.
//!
//! The calculation functions are total and never fail. Errors only appear at
//! the edges: loading configuration (a fatal startup condition) and talking to
//! the persistence collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for levelup-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration-specific errors.
///
/// A level table or config that fails validation reflects a programming or
/// deployment mistake, so these are raised once at startup.
#[derive(Error, Debug, PartialEq, Eq)]
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

    /// Level table has no entries
    #[error("Level table is empty")]
    EmptyLevelTable,

    /// Level 1 must exist and be unlocked at 0 points
    #[error("Level table must define level 1 at 0 points (found {found})")]
    MissingFloorLevel { found: String },

    /// The same level number appears twice
    #[error("Level {0} is defined more than once")]
    DuplicateLevel(u32),

    /// Thresholds must grow with the level number
    #[error(
        "Level {level} requires {points_required} points, \
         which is not above level {previous_level} ({previous_points})"
    )]
    NonIncreasingThreshold {
        level: u32,
        points_required: u64,
        previous_level: u32,
        previous_points: u64,
    },
}

/// Persistence-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A value could not be encoded for storage
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
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
