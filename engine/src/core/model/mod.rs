//! Document Model
//!
//! Plain storage for everything a document holds: ordered subtitle rows and
//! ordered styles. Commands are the only writers.

pub mod arena;
mod field;
mod row;
mod styles;
mod subtitles;
pub mod text;

pub use field::FieldValue;
pub use row::{FieldKind, SubtitleData, SubtitleField, SubtitleRow, DEFAULT_STYLE};
pub use styles::{RemovedStyle, StyleField, StyleModel, StyleRecord};
pub use subtitles::{RemovedRow, SubtitleModel, TimingContext};

/// Mutable state that commands operate on
#[derive(Clone, Debug, Default)]
pub struct DocumentModel {
    pub subtitles: SubtitleModel,
    pub styles: StyleModel,
}

impl DocumentModel {
    pub fn new(timing: TimingContext) -> Self {
        Self {
            subtitles: SubtitleModel::new(timing),
            styles: StyleModel::new(),
        }
    }
}
