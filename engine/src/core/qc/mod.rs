//! Timing Quality Control
//!
//! Checks a document against the timing thresholds in `TimingSettings`:
//! gaps, overlaps, display duration, reading speed and line layout.

pub mod engine;
pub mod rules;
pub mod violation;

pub use engine::{QCEngine, QCEngineConfig, QCReport};
pub use rules::{
    CharactersPerLineRule, CharactersPerSecondRule, MaxLinesRule, MinDurationRule, MinGapRule,
    OverlapRule, TimingRule,
};
pub use violation::{QCViolation, Severity, TimeRange};
