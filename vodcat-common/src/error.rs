//! Common error types for vodcat

use thiserror::Error;

/// Common result type for vodcat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the vodcat crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored record could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input or malformed stored data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Conditional write lost against a concurrent writer
    #[error("Version conflict on {table}/{id}: expected version {expected}")]
    VersionConflict {
        table: String,
        id: String,
        expected: i64,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
