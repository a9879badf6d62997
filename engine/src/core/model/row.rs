//! Subtitle Row
//!
//! One row of subtitle data: persisted attributes plus the derived fields
//! the model keeps up to date (duration, per-line counts, reading speed,
//! gaps to the neighbours).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{arena::Numbered, text, FieldValue};
use crate::core::{time::SubtitleTime, CoreError, CoreResult};

/// Default style name given to new rows
pub const DEFAULT_STYLE: &str = "Default";

// =============================================================================
// Field Keys
// =============================================================================

/// Persisted subtitle fields addressable by key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtitleField {
    Layer,
    Start,
    End,
    Duration,
    Style,
    Name,
    MarginL,
    MarginR,
    MarginV,
    Effect,
    Text,
    Translation,
    Note,
}

/// What a field edit affects, for change notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Timing,
    Text,
    Attribute,
}

impl SubtitleField {
    pub const ALL: [SubtitleField; 13] = [
        SubtitleField::Layer,
        SubtitleField::Start,
        SubtitleField::End,
        SubtitleField::Duration,
        SubtitleField::Style,
        SubtitleField::Name,
        SubtitleField::MarginL,
        SubtitleField::MarginR,
        SubtitleField::MarginV,
        SubtitleField::Effect,
        SubtitleField::Text,
        SubtitleField::Translation,
        SubtitleField::Note,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SubtitleField::Layer => "layer",
            SubtitleField::Start => "start",
            SubtitleField::End => "end",
            SubtitleField::Duration => "duration",
            SubtitleField::Style => "style",
            SubtitleField::Name => "name",
            SubtitleField::MarginL => "margin-l",
            SubtitleField::MarginR => "margin-r",
            SubtitleField::MarginV => "margin-v",
            SubtitleField::Effect => "effect",
            SubtitleField::Text => "text",
            SubtitleField::Translation => "translation",
            SubtitleField::Note => "note",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            SubtitleField::Start | SubtitleField::End | SubtitleField::Duration => FieldKind::Timing,
            SubtitleField::Text | SubtitleField::Translation => FieldKind::Text,
            _ => FieldKind::Attribute,
        }
    }
}

impl fmt::Display for SubtitleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SubtitleField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubtitleField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

// =============================================================================
// Row
// =============================================================================

/// Stored state of one subtitle.
///
/// `start`, `end`, `duration` and the gaps are in the document's storage
/// unit (milliseconds or frames).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleRow {
    pub num: usize,
    pub layer: i64,
    pub start: i64,
    pub end: i64,
    pub duration: i64,
    pub style: String,
    pub name: String,
    pub margin_l: i64,
    pub margin_r: i64,
    pub margin_v: i64,
    pub effect: String,
    pub text: String,
    pub translation: String,
    pub note: String,
    pub characters_per_line_text: Vec<usize>,
    pub characters_per_line_translation: Vec<usize>,
    pub characters_per_second_text: f64,
    pub gap_before: i64,
    pub gap_after: i64,
}

impl Default for SubtitleRow {
    fn default() -> Self {
        Self {
            num: 0,
            layer: 0,
            start: 0,
            end: 0,
            duration: 0,
            style: DEFAULT_STYLE.to_string(),
            name: String::new(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            effect: String::new(),
            text: String::new(),
            translation: String::new(),
            note: String::new(),
            characters_per_line_text: Vec::new(),
            characters_per_line_translation: Vec::new(),
            characters_per_second_text: 0.0,
            gap_before: 0,
            gap_after: 0,
        }
    }
}

impl Numbered for SubtitleRow {
    fn num(&self) -> usize {
        self.num
    }

    fn set_num(&mut self, num: usize) {
        self.num = num;
    }
}

impl SubtitleRow {
    /// Reads one persisted field
    pub fn get(&self, field: SubtitleField) -> FieldValue {
        match field {
            SubtitleField::Layer => FieldValue::Integer(self.layer),
            SubtitleField::Start => FieldValue::Integer(self.start),
            SubtitleField::End => FieldValue::Integer(self.end),
            SubtitleField::Duration => FieldValue::Integer(self.duration),
            SubtitleField::Style => FieldValue::Text(self.style.clone()),
            SubtitleField::Name => FieldValue::Text(self.name.clone()),
            SubtitleField::MarginL => FieldValue::Integer(self.margin_l),
            SubtitleField::MarginR => FieldValue::Integer(self.margin_r),
            SubtitleField::MarginV => FieldValue::Integer(self.margin_v),
            SubtitleField::Effect => FieldValue::Text(self.effect.clone()),
            SubtitleField::Text => FieldValue::Text(self.text.clone()),
            SubtitleField::Translation => FieldValue::Text(self.translation.clone()),
            SubtitleField::Note => FieldValue::Text(self.note.clone()),
        }
    }

    /// Writes one persisted field and the derived fields local to this row.
    ///
    /// Start/end/duration keep `duration == end - start`: start and end
    /// recompute the duration, duration moves the end.
    pub(crate) fn put(&mut self, field: SubtitleField, value: FieldValue) -> CoreResult<()> {
        let key = field.key();
        match field {
            SubtitleField::Layer => self.layer = value.as_integer(key)?,
            SubtitleField::Start => {
                self.start = value.as_integer(key)?;
                self.duration = self.end - self.start;
            }
            SubtitleField::End => {
                self.end = value.as_integer(key)?;
                self.duration = self.end - self.start;
            }
            SubtitleField::Duration => {
                self.duration = value.as_integer(key)?;
                self.end = self.start + self.duration;
            }
            SubtitleField::Style => self.style = value.into_text(),
            SubtitleField::Name => self.name = value.into_text(),
            SubtitleField::MarginL => self.margin_l = value.as_integer(key)?,
            SubtitleField::MarginR => self.margin_r = value.as_integer(key)?,
            SubtitleField::MarginV => self.margin_v = value.as_integer(key)?,
            SubtitleField::Effect => self.effect = value.into_text(),
            SubtitleField::Text => {
                self.text = value.into_text();
                self.characters_per_line_text = text::characters_per_line(&self.text);
            }
            SubtitleField::Translation => {
                self.translation = value.into_text();
                self.characters_per_line_translation =
                    text::characters_per_line(&self.translation);
            }
            SubtitleField::Note => self.note = value.into_text(),
        }
        Ok(())
    }

    /// Sets start and end, computing the duration once
    pub(crate) fn put_times(&mut self, start: i64, end: i64) {
        self.start = start;
        self.end = end;
        self.duration = end - start;
    }

    /// Copies every persisted field of `other`; derived fields are recomputed
    /// locally, gaps and CPS are left to the model.
    pub(crate) fn put_persisted(&mut self, other: &SubtitleRow) {
        self.layer = other.layer;
        self.put_times(other.start, other.end);
        self.style = other.style.clone();
        self.name = other.name.clone();
        self.margin_l = other.margin_l;
        self.margin_r = other.margin_r;
        self.margin_v = other.margin_v;
        self.effect = other.effect.clone();
        self.text = other.text.clone();
        self.translation = other.translation.clone();
        self.note = other.note.clone();
        self.refresh_line_counts();
    }

    pub(crate) fn refresh_line_counts(&mut self) {
        self.characters_per_line_text = text::characters_per_line(&self.text);
        self.characters_per_line_translation = text::characters_per_line(&self.translation);
    }
}

// =============================================================================
// Portable Data
// =============================================================================

/// Persisted subtitle content with timing in milliseconds.
///
/// Independent of any document's storage unit, so it moves between
/// documents (clipboard, duplication, format plugins).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleData {
    pub layer: i64,
    pub start: SubtitleTime,
    pub end: SubtitleTime,
    pub style: String,
    pub name: String,
    pub margin_l: i64,
    pub margin_r: i64,
    pub margin_v: i64,
    pub effect: String,
    pub text: String,
    pub translation: String,
    pub note: String,
}

impl Default for SubtitleData {
    fn default() -> Self {
        Self {
            layer: 0,
            start: SubtitleTime::ZERO,
            end: SubtitleTime::ZERO,
            style: DEFAULT_STYLE.to_string(),
            name: String::new(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            effect: String::new(),
            text: String::new(),
            translation: String::new(),
            note: String::new(),
        }
    }
}

impl SubtitleData {
    pub fn new(start: SubtitleTime, end: SubtitleTime, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn duration(&self) -> SubtitleTime {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_round_trip() {
        for field in SubtitleField::ALL {
            assert_eq!(field.key().parse::<SubtitleField>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = "colour".parse::<SubtitleField>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownField(key) if key == "colour"));
    }

    #[test]
    fn timing_puts_keep_duration_consistent() {
        let mut row = SubtitleRow::default();
        row.put(SubtitleField::Start, FieldValue::Integer(1000)).unwrap();
        assert_eq!(row.duration, -1000);
        row.put(SubtitleField::End, FieldValue::Integer(3000)).unwrap();
        assert_eq!(row.duration, 2000);
        row.put(SubtitleField::Duration, FieldValue::Integer(500)).unwrap();
        assert_eq!(row.end, 1500);
        assert_eq!(row.duration, row.end - row.start);
    }

    #[test]
    fn text_put_refreshes_line_counts() {
        let mut row = SubtitleRow::default();
        row.put(SubtitleField::Text, "<i>ab</i>\ncde".into()).unwrap();
        assert_eq!(row.characters_per_line_text, vec![2, 3]);
        row.put(SubtitleField::Translation, "xyz".into()).unwrap();
        assert_eq!(row.characters_per_line_translation, vec![3]);
    }

    #[test]
    fn get_returns_typed_values() {
        let mut row = SubtitleRow::default();
        row.put(SubtitleField::MarginV, "12".into()).unwrap();
        assert_eq!(row.get(SubtitleField::MarginV), FieldValue::Integer(12));
        assert_eq!(row.get(SubtitleField::Style), FieldValue::from("Default"));
    }

    #[test]
    fn bad_integer_is_rejected() {
        let mut row = SubtitleRow::default();
        assert!(row.put(SubtitleField::Layer, "top".into()).is_err());
        assert_eq!(row.layer, 0);
    }
}
