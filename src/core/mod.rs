/// Core Module
///
/// This module contains the database access layer and the shared error type
/// used across the crate.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{AccessError, Result};
