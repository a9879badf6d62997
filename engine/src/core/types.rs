//! Subtitle Editor Core Type Definitions
//!
//! Defines fundamental types used throughout the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Stable handle to one subtitle row of a document.
///
/// Slots are never reused, so a handle to a removed row stays invalid until
/// an undo puts the very same row back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubtitleId(pub(crate) usize);

impl SubtitleId {
    /// Arena slot index backing this handle
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SubtitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subtitle#{}", self.0)
    }
}

/// Stable handle to one style record of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StyleId(pub(crate) usize);

impl StyleId {
    /// Arena slot index backing this handle
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "style#{}", self.0)
    }
}

/// Operation unique identifier (ULID), one per committed command group
pub type OpId = String;

/// Listener registration identifier
pub type SubscriptionId = u64;

// =============================================================================
// Timing Mode
// =============================================================================

/// Unit in which timing values are stored or edited
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    /// Milliseconds
    #[default]
    Time,
    /// Frame numbers at the document framerate
    Frame,
}

impl fmt::Display for TimingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingMode::Time => write!(f, "time"),
            TimingMode::Frame => write!(f, "frame"),
        }
    }
}

// =============================================================================
// Newline Convention
// =============================================================================

/// Line terminator used when a document is written back to disk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Newline {
    /// `\n`
    #[default]
    Unix,
    /// `\r\n`
    Windows,
    /// `\r`
    Macintosh,
}

impl Newline {
    /// Terminator characters
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Unix => "\n",
            Newline::Windows => "\r\n",
            Newline::Macintosh => "\r",
        }
    }

    /// Guesses the convention from the first terminator found in `data`.
    pub fn detect(data: &str) -> Option<Self> {
        let pos = data.find(['\r', '\n'])?;
        let rest = &data[pos..];
        if rest.starts_with("\r\n") {
            Some(Newline::Windows)
        } else if rest.starts_with('\r') {
            Some(Newline::Macintosh)
        } else {
            Some(Newline::Unix)
        }
    }
}

impl fmt::Display for Newline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Newline::Unix => write!(f, "Unix"),
            Newline::Windows => write!(f, "Windows"),
            Newline::Macintosh => write!(f, "Macintosh"),
        }
    }
}

impl FromStr for Newline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" => Ok(Newline::Unix),
            "windows" => Ok(Newline::Windows),
            "macintosh" | "mac" => Ok(Newline::Macintosh),
            other => Err(format!("Unknown newline convention: {}", other)),
        }
    }
}
