//! Subtitle Editor Core Library
//!
//! Editing engine behind the subtitle editor: the subtitle timing model,
//! the undo/redo command system, timing validation and the format plugin
//! contract. Nothing in here depends on a GUI toolkit; views subscribe to
//! [`core::events::DocumentEvent`]s and drive edits through [`core::document::Document`].

pub mod core;

pub use crate::core::{
    document::{Document, Style, Styles, StylesMut, Subtitle, SubtitleMut, Subtitles, SubtitlesMut},
    events::DocumentEvent,
    formats::{FormatRegistry, SubtitleFormatIO},
    qc::QCEngine,
    settings::{AppSettings, SettingsManager},
    time::{FrameRate, SubtitleTime},
    CoreError, CoreResult, StyleId, SubtitleId, TimingMode,
};
