//! Core error types for drillplan-core.
//!
//! Errors fall in two groups. Fatal errors ([`StorageError`],
//! [`ConcurrencyError`], [`ConfigError`], [`CatalogError`]) abort the
//! invocation before anything is committed. Per-entry errors
//! ([`EntryError`]) are collected by the sync engine while the rest of the
//! batch keeps going.

use std::path::PathBuf;
use thiserror::Error;

use crate::problem::ProblemId;

/// Core error type for drillplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persisted state could not be read, parsed or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Another run holds the journey lock
    #[error("Concurrency error: {0}")]
    Concurrency(#[from] ConcurrencyError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Problem list errors
    #[error("Problem list error: {0}")]
    Catalog(#[from] CatalogError),

    /// Validation errors outside of a sync batch
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the state snapshot store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No snapshot exists yet
    #[error("No study plan initialized at {path} (run `drillplan init` first)")]
    NotInitialized { path: PathBuf },

    /// `init` would overwrite an existing journey
    #[error("A study plan already exists at {path} (use --force to start over; the old state is archived)")]
    AlreadyInitialized { path: PathBuf },

    /// Snapshot exists but could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not valid JSON or violates a state invariant
    #[error("State snapshot {path} is corrupt: {message} (last known-good copy: {backup})")]
    Corrupt {
        path: PathBuf,
        message: String,
        backup: String,
    },

    /// Writing or replacing the snapshot failed
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be serialized
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Archiving on reset failed
    #[error("Failed to archive {path}: {source}")]
    ArchiveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the concurrent-run marker.
#[derive(Error, Debug)]
pub enum ConcurrencyError {
    /// The lock file already exists
    #[error("Another drillplan run is in progress ({holder}); if it is not, delete {path}")]
    Locked { path: PathBuf, holder: String },

    /// The lock file could not be created
    #[error("Failed to create lock file {path}: {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
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
}

/// Problem list errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The problem list file is missing or unreadable
    #[error("Failed to read problem list {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The problem list is not in the expected shape
    #[error("Failed to parse problem list {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The same id appears twice in the merged list
    #[error("Problem id {id} appears more than once (in '{first}' and '{second}')")]
    DuplicateId {
        id: ProblemId,
        first: String,
        second: String,
    },

    /// The list has no problems
    #[error("Problem list '{0}' contains no problems")]
    Empty(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Checked entry with an empty rating field
    #[error("rating is missing")]
    MissingRating,

    /// Rating is a number outside 1-4
    #[error("rating {0} is out of range (expected 1-4)")]
    RatingOutOfRange(i64),

    /// Rating field holds something that is not a number
    #[error("rating '{0}' is not a number")]
    MalformedRating(String),

    /// Manual time field could not be parsed
    #[error("manual time '{0}' is not a duration (try 25m, 1h 5m, 95s or 00:25:00)")]
    MalformedDuration(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// A recoverable problem with one entry of a plan document.
///
/// The entry's record is left untouched and the sync run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("problem {id}: {source}")]
    Validation {
        id: ProblemId,
        #[source]
        source: ValidationError,
    },

    #[error("problem {id}: no time recorded (no workspace file found and no manual time given)")]
    MissingData { id: ProblemId },

    #[error("problem {id} is not part of the current study plan")]
    Consistency { id: ProblemId },
}

impl EntryError {
    pub fn id(&self) -> ProblemId {
        match self {
            EntryError::Validation { id, .. }
            | EntryError::MissingData { id }
            | EntryError::Consistency { id } => *id,
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
