/// Access Error Module
///
/// This module defines the error type shared by every fallible operation of
/// the access layer. Engine failures carry the underlying `rusqlite` error so
/// callers can decide whether to retry, abort, or ignore.
use thiserror::Error;

/// Error type for the SQLite access layer.
///
/// Covers:
/// - Engine errors (connection, statement preparation, execution, commit, close)
/// - Use of an accessor whose connection is not open
/// - Configuration loading
/// - Logging setup
/// - File system operations
#[derive(Error, Debug)]
pub enum AccessError {
    /// Errors raised by the embedded SQLite engine
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A statement was issued while no connection was open
    #[error("Connection error: no open connection to {0}")]
    NotOpen(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging subscriber setup errors
    #[error("Logging error: {0}")]
    Logging(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccessError {
    /// Returns the engine error code when this is a SQLite failure.
    pub fn sqlite_code(&self) -> Option<rusqlite::ErrorCode> {
        match self {
            AccessError::Database(e) => e.sqlite_error_code(),
            _ => None,
        }
    }
}

/// Type alias for Result to use AccessError as the error type.
pub type Result<T> = std::result::Result<T, AccessError>;
