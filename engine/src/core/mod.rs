//! Subtitle Editor Core Engine
//!
//! Core editing engine module.
//! Handles the subtitle model, command history, timing checks and format I/O.

pub mod commands;
pub mod document;
pub mod events;
pub mod formats;
pub mod fs;
pub mod logging;
pub mod model;
pub mod qc;
pub mod settings;
pub mod time;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_properties;
