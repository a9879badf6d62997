//! QC Violation Types
//!
//! Defines violations and severity levels.

use serde::{Deserialize, Serialize};

use crate::core::SubtitleId;

/// Time span of a violation, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Check if this range contains a specific time
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms <= self.end_ms
    }
}

/// Severity level of a QC violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suggestion for improvement
    Info,
    /// Potential issue, review recommended
    Warning,
    /// Definite issue that should be fixed
    Error,
}

impl Severity {
    /// Check if this severity meets or exceeds a threshold
    pub fn meets_threshold(&self, threshold: Severity) -> bool {
        *self >= threshold
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A QC violation found during checking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QCViolation {
    /// Unique violation ID
    pub id: String,
    /// Name of the rule that found this violation
    pub rule_name: String,
    pub severity: Severity,
    /// Offending subtitle
    pub subtitle_id: Option<SubtitleId>,
    /// Its 1-based number at check time
    pub subtitle_num: Option<usize>,
    pub location: Option<TimeRange>,
    /// Human-readable message explaining the issue
    pub message: String,
    pub details: Option<String>,
}

impl QCViolation {
    pub fn new(rule_name: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            rule_name: rule_name.into(),
            severity,
            subtitle_id: None,
            subtitle_num: None,
            location: None,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_subtitle(mut self, id: SubtitleId, num: usize) -> Self {
        self.subtitle_id = Some(id);
        self.subtitle_num = Some(num);
        self
    }

    pub fn with_location(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.location = Some(TimeRange::new(start_ms, end_ms));
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
