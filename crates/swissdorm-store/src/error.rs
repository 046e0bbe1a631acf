use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A domain instant the nanosecond timestamp columns cannot hold
    /// (outside 1677-09-21..2262-04-11).
    #[error("Timestamp {value} for {column} is outside the storable range")]
    TimestampOutOfRange {
        column: &'static str,
        value: DateTime<Utc>,
    },

    /// The shared cache has been closed.
    #[error("Database is closed")]
    Closed,

    /// A blocking database task panicked or was aborted.
    #[error("Database task failed: {0}")]
    Task(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
