// Core infrastructure modules
pub mod core;

// Ambient modules
pub mod config;
pub mod logging;

// Demonstration sequence
pub mod demo;

#[cfg(test)]
mod test_utils;

pub use crate::core::db::{Cursor, DatabaseAccessor};
pub use crate::core::{AccessError, Result};
