//! Subtitle Editor Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

use super::{formats::FormatError, time::TimeParseError, StyleId, SubtitleId};

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Handle Errors
    // =========================================================================
    #[error("Invalid subtitle handle: {0}")]
    InvalidHandle(SubtitleId),

    #[error("Invalid style handle: {0}")]
    InvalidStyleHandle(StyleId),

    #[error("Position out of range: {position} (size {size})")]
    PositionOutOfRange { position: usize, size: usize },

    // =========================================================================
    // Field Errors
    // =========================================================================
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    // =========================================================================
    // Time Errors
    // =========================================================================
    #[error("Time parse error: {0}")]
    TimeParse(#[from] TimeParseError),

    // =========================================================================
    // Format Errors
    // =========================================================================
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Builds an [`CoreError::InvalidFieldValue`]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Short message suitable for a transient status bar
    pub fn to_status_message(&self) -> String {
        self.to_string()
    }
}
