//! Subtitle Handles
//!
//! `Subtitle` reads one row of a document; `SubtitleMut` edits it through
//! undoable commands.

use crate::core::{
    commands::{SetSubtitleDataCommand, SetSubtitleFieldCommand, SetSubtitleTimesCommand},
    document::Document,
    model::{FieldValue, SubtitleData, SubtitleField, SubtitleRow, TimingContext},
    time::SubtitleTime,
    CoreResult, SubtitleId,
};

/// Tolerance applied around the CPS thresholds
const CPS_EPSILON: f64 = 1e-6;

// =============================================================================
// Read Handle
// =============================================================================

/// Read-only view of one subtitle
#[derive(Clone, Copy)]
pub struct Subtitle<'a> {
    id: SubtitleId,
    row: &'a SubtitleRow,
    timing: TimingContext,
    size: usize,
}

impl std::fmt::Debug for Subtitle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subtitle")
            .field("id", &self.id)
            .field("num", &self.row.num)
            .field("text", &self.row.text)
            .finish()
    }
}

impl<'a> Subtitle<'a> {
    pub(crate) fn new(document: &'a Document, id: SubtitleId) -> CoreResult<Self> {
        let model = &document.model().subtitles;
        Ok(Self {
            id,
            row: model.row(id)?,
            timing: model.timing(),
            size: model.len(),
        })
    }

    pub fn id(&self) -> SubtitleId {
        self.id
    }

    /// 1-based sequence number
    pub fn num(&self) -> usize {
        self.row.num
    }

    /// Underlying stored row, including derived fields
    pub fn row(&self) -> &'a SubtitleRow {
        self.row
    }

    pub fn is_first(&self) -> bool {
        self.row.num == 1
    }

    pub fn is_last(&self) -> bool {
        self.row.num == self.size
    }

    // =========================================================================
    // Timing
    // =========================================================================

    pub fn start(&self) -> SubtitleTime {
        self.timing.to_time(self.row.start)
    }

    pub fn end(&self) -> SubtitleTime {
        self.timing.to_time(self.row.end)
    }

    pub fn duration(&self) -> SubtitleTime {
        self.timing.to_time(self.row.duration)
    }

    pub fn start_frame(&self) -> i64 {
        self.timing.to_frame(self.row.start)
    }

    pub fn end_frame(&self) -> i64 {
        self.timing.to_frame(self.row.end)
    }

    pub fn duration_frame(&self) -> i64 {
        self.timing.to_frame(self.row.duration)
    }

    /// Start in the document's storage unit (milliseconds or frames)
    pub fn start_value(&self) -> i64 {
        self.row.start
    }

    pub fn end_value(&self) -> i64 {
        self.row.end
    }

    pub fn duration_value(&self) -> i64 {
        self.row.duration
    }

    pub fn gap_before(&self) -> SubtitleTime {
        self.timing.to_time(self.row.gap_before)
    }

    pub fn gap_after(&self) -> SubtitleTime {
        self.timing.to_time(self.row.gap_after)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn layer(&self) -> i64 {
        self.row.layer
    }

    pub fn style(&self) -> &'a str {
        &self.row.style
    }

    /// Actor
    pub fn name(&self) -> &'a str {
        &self.row.name
    }

    pub fn margin_l(&self) -> i64 {
        self.row.margin_l
    }

    pub fn margin_r(&self) -> i64 {
        self.row.margin_r
    }

    pub fn margin_v(&self) -> i64 {
        self.row.margin_v
    }

    pub fn effect(&self) -> &'a str {
        &self.row.effect
    }

    pub fn text(&self) -> &'a str {
        &self.row.text
    }

    pub fn translation(&self) -> &'a str {
        &self.row.translation
    }

    pub fn note(&self) -> &'a str {
        &self.row.note
    }

    pub fn characters_per_line_text(&self) -> &'a [usize] {
        &self.row.characters_per_line_text
    }

    pub fn characters_per_line_translation(&self) -> &'a [usize] {
        &self.row.characters_per_line_translation
    }

    pub fn characters_per_second_text(&self) -> f64 {
        self.row.characters_per_second_text
    }

    /// Field by key; timing fields are in the storage unit
    pub fn get(&self, field: SubtitleField) -> FieldValue {
        self.row.get(field)
    }

    /// Portable copy of every persisted field
    pub fn data(&self) -> SubtitleData {
        SubtitleData {
            layer: self.row.layer,
            start: self.start(),
            end: self.end(),
            style: self.row.style.clone(),
            name: self.row.name.clone(),
            margin_l: self.row.margin_l,
            margin_r: self.row.margin_r,
            margin_v: self.row.margin_v,
            effect: self.row.effect.clone(),
            text: self.row.text.clone(),
            translation: self.row.translation.clone(),
            note: self.row.note.clone(),
        }
    }

    /// Copies every persisted field onto another subtitle; the target
    /// recomputes its own derived fields.
    pub fn copy_to(&self, target: &mut SubtitleMut<'_>) -> CoreResult<()> {
        target.assign(&self.data())
    }

    // =========================================================================
    // Checks
    // =========================================================================

    /// Gap to the previous subtitle is at least `min_gap_ms`; always true
    /// for the first subtitle.
    pub fn check_gap_before(&self, min_gap_ms: i64) -> bool {
        self.is_first() || self.gap_before().totalmsecs() >= min_gap_ms
    }

    /// Gap to the next subtitle is at least `min_gap_ms`; always true for
    /// the last subtitle.
    pub fn check_gap_after(&self, min_gap_ms: i64) -> bool {
        self.is_last() || self.gap_after().totalmsecs() >= min_gap_ms
    }

    /// Reading speed against thresholds: -1 too slow, 0 ok, +1 too fast.
    ///
    /// The speed is rounded to one decimal before comparing.
    pub fn check_cps_text(&self, min_cps: f64, max_cps: f64) -> i32 {
        let cps = (self.row.characters_per_second_text * 10.0).round() / 10.0;
        if cps < min_cps - CPS_EPSILON {
            -1
        } else if cps > max_cps + CPS_EPSILON {
            1
        } else {
            0
        }
    }

    /// Displayed for at least `min_display_ms`
    pub fn check_duration(&self, min_display_ms: i64) -> bool {
        self.duration().totalmsecs() >= min_display_ms
    }

    /// No text line is longer than `max` visible characters
    pub fn check_characters_per_line(&self, max: usize) -> bool {
        self.row
            .characters_per_line_text
            .iter()
            .all(|count| *count <= max)
    }
}

// =============================================================================
// Mutable Handle
// =============================================================================

/// Editing handle for one subtitle. Every setter goes through a command, so
/// it is recorded when a command group is open.
pub struct SubtitleMut<'a> {
    document: &'a mut Document,
    id: SubtitleId,
}

impl<'a> SubtitleMut<'a> {
    pub(crate) fn new(document: &'a mut Document, id: SubtitleId) -> CoreResult<Self> {
        document.model().subtitles.row(id)?;
        Ok(Self { document, id })
    }

    pub fn id(&self) -> SubtitleId {
        self.id
    }

    /// Read view of the current state
    pub fn get_ref(&self) -> CoreResult<Subtitle<'_>> {
        Subtitle::new(&*self.document, self.id)
    }

    fn timing(&self) -> TimingContext {
        self.document.model().subtitles.timing()
    }

    fn put(&mut self, field: SubtitleField, value: FieldValue) -> CoreResult<()> {
        self.document
            .apply(Box::new(SetSubtitleFieldCommand::new(self.id, field, value)))
            .map(|_| ())
    }

    // =========================================================================
    // Timing
    // =========================================================================

    /// Moves the start; the end stays, the duration follows
    pub fn set_start(&mut self, time: SubtitleTime) -> CoreResult<()> {
        let value = self.timing().from_time(time);
        self.set_start_value(value)
    }

    /// Moves the end; the duration follows
    pub fn set_end(&mut self, time: SubtitleTime) -> CoreResult<()> {
        let value = self.timing().from_time(time);
        self.set_end_value(value)
    }

    /// Sets the duration; the end follows
    pub fn set_duration(&mut self, time: SubtitleTime) -> CoreResult<()> {
        let value = self.timing().from_time(time);
        self.set_duration_value(value)
    }

    /// Sets both ends, computing the duration once
    pub fn set_start_and_end(&mut self, start: SubtitleTime, end: SubtitleTime) -> CoreResult<()> {
        let timing = self.timing();
        self.set_start_and_end_value(timing.from_time(start), timing.from_time(end))
    }

    pub fn set_start_frame(&mut self, frame: i64) -> CoreResult<()> {
        let value = self.timing().from_frame(frame);
        self.set_start_value(value)
    }

    pub fn set_end_frame(&mut self, frame: i64) -> CoreResult<()> {
        let value = self.timing().from_frame(frame);
        self.set_end_value(value)
    }

    pub fn set_duration_frame(&mut self, frames: i64) -> CoreResult<()> {
        let value = self.timing().from_frame(frames);
        self.set_duration_value(value)
    }

    /// Start in the storage unit
    pub fn set_start_value(&mut self, value: i64) -> CoreResult<()> {
        self.put(SubtitleField::Start, FieldValue::Integer(value))
    }

    pub fn set_end_value(&mut self, value: i64) -> CoreResult<()> {
        self.put(SubtitleField::End, FieldValue::Integer(value))
    }

    pub fn set_duration_value(&mut self, value: i64) -> CoreResult<()> {
        self.put(SubtitleField::Duration, FieldValue::Integer(value))
    }

    pub fn set_start_and_end_value(&mut self, start: i64, end: i64) -> CoreResult<()> {
        self.document
            .apply(Box::new(SetSubtitleTimesCommand::new(self.id, start, end)))
            .map(|_| ())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn set_layer(&mut self, layer: i64) -> CoreResult<()> {
        self.put(SubtitleField::Layer, FieldValue::Integer(layer))
    }

    pub fn set_style(&mut self, style: &str) -> CoreResult<()> {
        self.put(SubtitleField::Style, style.into())
    }

    pub fn set_name(&mut self, name: &str) -> CoreResult<()> {
        self.put(SubtitleField::Name, name.into())
    }

    pub fn set_margin_l(&mut self, margin: i64) -> CoreResult<()> {
        self.put(SubtitleField::MarginL, FieldValue::Integer(margin))
    }

    pub fn set_margin_r(&mut self, margin: i64) -> CoreResult<()> {
        self.put(SubtitleField::MarginR, FieldValue::Integer(margin))
    }

    pub fn set_margin_v(&mut self, margin: i64) -> CoreResult<()> {
        self.put(SubtitleField::MarginV, FieldValue::Integer(margin))
    }

    pub fn set_effect(&mut self, effect: &str) -> CoreResult<()> {
        self.put(SubtitleField::Effect, effect.into())
    }

    /// Also refreshes the per-line counts and the reading speed
    pub fn set_text(&mut self, text: &str) -> CoreResult<()> {
        self.put(SubtitleField::Text, text.into())
    }

    pub fn set_translation(&mut self, translation: &str) -> CoreResult<()> {
        self.put(SubtitleField::Translation, translation.into())
    }

    pub fn set_note(&mut self, note: &str) -> CoreResult<()> {
        self.put(SubtitleField::Note, note.into())
    }

    /// Field by key; timing fields are in the storage unit
    pub fn set(&mut self, field: SubtitleField, value: FieldValue) -> CoreResult<()> {
        self.put(field, value)
    }

    /// Replaces every persisted field as one command
    pub fn assign(&mut self, data: &SubtitleData) -> CoreResult<()> {
        let row = self.document.model().subtitles.row_from_data(data);
        self.document
            .apply(Box::new(SetSubtitleDataCommand::new(self.id, row)))
            .map(|_| ())
    }

    // =========================================================================
    // Derived Fields
    // =========================================================================

    /// Recomputes the gap to the previous subtitle on both rows; false for
    /// the first subtitle.
    pub fn update_gap_before(&mut self) -> CoreResult<bool> {
        self.document.model_mut().subtitles.update_gap_before(self.id)
    }

    /// Recomputes the gap to the next subtitle on both rows; false for the
    /// last subtitle.
    pub fn update_gap_after(&mut self) -> CoreResult<bool> {
        self.document.model_mut().subtitles.update_gap_after(self.id)
    }
}
