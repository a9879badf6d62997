//! Subtitle Model
//!
//! Ordered subtitle storage. Every mutation goes through here so the derived
//! fields (duration, per-line counts, CPS, neighbour gaps) are recomputed
//! synchronously with the change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    arena::{OrderedArena, Removed},
    text, FieldKind, FieldValue, SubtitleData, SubtitleField, SubtitleRow,
};
use crate::core::{
    time::{FrameRate, SubtitleTime},
    CoreResult, SubtitleId, TimingMode,
};

/// Row removed from (or re-inserted into) the model
pub type RemovedRow = Removed<SubtitleId, SubtitleRow>;

// =============================================================================
// Timing Context
// =============================================================================

/// Storage unit of a document's timing values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimingContext {
    pub mode: TimingMode,
    pub framerate: FrameRate,
}

impl TimingContext {
    pub fn new(mode: TimingMode, framerate: FrameRate) -> Self {
        Self { mode, framerate }
    }

    /// Stored value -> time
    pub fn to_time(&self, value: i64) -> SubtitleTime {
        match self.mode {
            TimingMode::Time => SubtitleTime::new(value),
            TimingMode::Frame => SubtitleTime::frame_to_time(value, self.framerate.value()),
        }
    }

    /// Time -> stored value
    pub fn from_time(&self, time: SubtitleTime) -> i64 {
        match self.mode {
            TimingMode::Time => time.totalmsecs(),
            TimingMode::Frame => SubtitleTime::time_to_frame(time, self.framerate.value()),
        }
    }

    /// Stored value -> frame number
    pub fn to_frame(&self, value: i64) -> i64 {
        match self.mode {
            TimingMode::Time => SubtitleTime::time_to_frame(
                SubtitleTime::new(value),
                self.framerate.value(),
            ),
            TimingMode::Frame => value,
        }
    }

    /// Frame number -> stored value
    pub fn from_frame(&self, frame: i64) -> i64 {
        match self.mode {
            TimingMode::Time => {
                SubtitleTime::frame_to_time(frame, self.framerate.value()).totalmsecs()
            }
            TimingMode::Frame => frame,
        }
    }
}

// =============================================================================
// Subtitle Model
// =============================================================================

/// Ordered subtitle rows of one document
#[derive(Clone, Debug, Default)]
pub struct SubtitleModel {
    rows: OrderedArena<SubtitleId, SubtitleRow>,
    timing: TimingContext,
}

impl SubtitleModel {
    pub fn new(timing: TimingContext) -> Self {
        Self {
            rows: OrderedArena::new(),
            timing,
        }
    }

    pub fn timing(&self) -> TimingContext {
        self.timing
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: SubtitleId) -> Option<&SubtitleRow> {
        self.rows.get(id)
    }

    pub fn row(&self, id: SubtitleId) -> CoreResult<&SubtitleRow> {
        self.rows.try_get(id)
    }

    pub fn contains(&self, id: SubtitleId) -> bool {
        self.rows.get(id).is_some()
    }

    /// 0-based position in document order
    pub fn position(&self, id: SubtitleId) -> CoreResult<usize> {
        self.rows.position(id)
    }

    pub fn id_at(&self, position: usize) -> Option<SubtitleId> {
        self.rows.id_at(position)
    }

    /// Ids in document order
    pub fn ids(&self) -> &[SubtitleId] {
        self.rows.ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SubtitleId, &SubtitleRow)> + '_ {
        self.rows.iter()
    }

    /// Builds a stored row from portable data in this model's unit
    pub fn row_from_data(&self, data: &SubtitleData) -> SubtitleRow {
        let mut row = SubtitleRow {
            layer: data.layer,
            style: data.style.clone(),
            name: data.name.clone(),
            margin_l: data.margin_l,
            margin_r: data.margin_r,
            margin_v: data.margin_v,
            effect: data.effect.clone(),
            text: data.text.clone(),
            translation: data.translation.clone(),
            note: data.note.clone(),
            ..Default::default()
        };
        row.put_times(
            self.timing.from_time(data.start),
            self.timing.from_time(data.end),
        );
        row.refresh_line_counts();
        row
    }

    /// Portable copy of a stored row
    pub fn data_from_row(&self, row: &SubtitleRow) -> SubtitleData {
        SubtitleData {
            layer: row.layer,
            start: self.timing.to_time(row.start),
            end: self.timing.to_time(row.end),
            style: row.style.clone(),
            name: row.name.clone(),
            margin_l: row.margin_l,
            margin_r: row.margin_r,
            margin_v: row.margin_v,
            effect: row.effect.clone(),
            text: row.text.clone(),
            translation: row.translation.clone(),
            note: row.note.clone(),
        }
    }

    // =========================================================================
    // Structural Mutations
    // =========================================================================

    pub(crate) fn allocate_id(&mut self) -> SubtitleId {
        self.rows.allocate()
    }

    /// Inserts rows at their recorded positions (ascending)
    pub(crate) fn insert_rows(&mut self, entries: Vec<RemovedRow>) -> CoreResult<Vec<SubtitleId>> {
        let ids: Vec<SubtitleId> = entries.iter().map(|entry| entry.id).collect();
        let positions = self.rows.insert_many(entries)?;

        for id in &ids {
            if let Some(row) = self.rows.get_mut(*id) {
                row.refresh_line_counts();
            }
            self.refresh_cps(*id);
        }
        for position in positions {
            self.refresh_gaps_at(position);
        }

        debug!(count = ids.len(), size = self.len(), "Inserted subtitle rows");
        Ok(ids)
    }

    /// Removes a batch of rows and repairs the gaps around every removed run
    pub(crate) fn remove_rows(&mut self, ids: &[SubtitleId]) -> CoreResult<Vec<RemovedRow>> {
        let removed = self.rows.remove_many(ids)?;

        // The row that followed a removed run now sits at the run's original
        // position minus everything removed before it.
        let mut affected = BTreeSet::new();
        for (already_removed, entry) in removed.iter().enumerate() {
            let position = entry.position - already_removed;
            affected.insert(position);
            if position > 0 {
                affected.insert(position - 1);
            }
        }
        for position in affected {
            if position < self.len() {
                self.refresh_gaps_at(position);
            }
        }

        debug!(count = removed.len(), size = self.len(), "Removed subtitle rows");
        Ok(removed)
    }

    /// Applies a new document order (a permutation of the current one)
    pub(crate) fn reorder(&mut self, order: Vec<SubtitleId>) -> CoreResult<()> {
        self.rows.reorder(order)?;
        self.refresh_all_gaps();
        Ok(())
    }

    // =========================================================================
    // Field Mutations
    // =========================================================================

    /// Writes one field, then the derived fields that depend on it
    pub(crate) fn set_field(
        &mut self,
        id: SubtitleId,
        field: SubtitleField,
        value: FieldValue,
    ) -> CoreResult<FieldKind> {
        self.rows.try_get_mut(id)?.put(field, value)?;

        let kind = field.kind();
        match kind {
            FieldKind::Timing => {
                self.refresh_cps(id);
                let position = self.position(id)?;
                self.refresh_gaps_at(position);
            }
            FieldKind::Text => self.refresh_cps(id),
            FieldKind::Attribute => {}
        }
        Ok(kind)
    }

    /// Writes start and end together
    pub(crate) fn set_times(&mut self, id: SubtitleId, start: i64, end: i64) -> CoreResult<()> {
        self.rows.try_get_mut(id)?.put_times(start, end);
        self.refresh_cps(id);
        let position = self.position(id)?;
        self.refresh_gaps_at(position);
        Ok(())
    }

    /// Replaces every persisted field with those of `source`
    pub(crate) fn replace_persisted(&mut self, id: SubtitleId, source: &SubtitleRow) -> CoreResult<()> {
        self.rows.try_get_mut(id)?.put_persisted(source);
        self.refresh_cps(id);
        let position = self.position(id)?;
        self.refresh_gaps_at(position);
        Ok(())
    }

    /// Switches storage unit or framerate, converting every stored value
    pub(crate) fn set_timing(&mut self, timing: TimingContext) {
        let previous = self.timing;
        self.timing = timing;

        if previous.mode != timing.mode {
            let ids: Vec<SubtitleId> = self.rows.ids().to_vec();
            for id in ids {
                if let Some(row) = self.rows.get_mut(id) {
                    let start = timing.from_time(previous.to_time(row.start));
                    let end = timing.from_time(previous.to_time(row.end));
                    row.put_times(start, end);
                }
            }
        }

        let ids: Vec<SubtitleId> = self.rows.ids().to_vec();
        for id in ids {
            self.refresh_cps(id);
        }
        self.refresh_all_gaps();
    }

    // =========================================================================
    // Derived Fields
    // =========================================================================

    /// Recomputes the gap between `id` and the row before it, writing both
    /// sides. The first row has no gap before; it is reset to zero and
    /// `false` is returned.
    pub fn update_gap_before(&mut self, id: SubtitleId) -> CoreResult<bool> {
        let position = self.position(id)?;
        Ok(self.write_gap_before(position))
    }

    /// Recomputes the gap between `id` and the row after it, writing both
    /// sides. Returns `false` for the last row.
    pub fn update_gap_after(&mut self, id: SubtitleId) -> CoreResult<bool> {
        let position = self.position(id)?;
        Ok(self.write_gap_after(position))
    }

    fn write_gap_before(&mut self, position: usize) -> bool {
        let Some(current) = self.rows.id_at(position) else {
            return false;
        };
        if position == 0 {
            if let Some(row) = self.rows.get_mut(current) {
                row.gap_before = 0;
            }
            return false;
        }
        match self.rows.id_at(position - 1) {
            Some(previous) => self.write_gap(previous, current),
            None => false,
        }
    }

    fn write_gap_after(&mut self, position: usize) -> bool {
        let Some(current) = self.rows.id_at(position) else {
            return false;
        };
        match self.rows.id_at(position + 1) {
            Some(next) => self.write_gap(current, next),
            None => {
                if let Some(row) = self.rows.get_mut(current) {
                    row.gap_after = 0;
                }
                false
            }
        }
    }

    fn write_gap(&mut self, earlier: SubtitleId, later: SubtitleId) -> bool {
        let (Some(earlier_end), Some(later_start)) = (
            self.rows.get(earlier).map(|row| row.end),
            self.rows.get(later).map(|row| row.start),
        ) else {
            return false;
        };
        let gap = later_start - earlier_end;
        if let Some(row) = self.rows.get_mut(earlier) {
            row.gap_after = gap;
        }
        if let Some(row) = self.rows.get_mut(later) {
            row.gap_before = gap;
        }
        true
    }

    fn refresh_gaps_at(&mut self, position: usize) {
        self.write_gap_before(position);
        self.write_gap_after(position);
    }

    fn refresh_all_gaps(&mut self) {
        for position in 0..self.len() {
            self.write_gap_after(position);
        }
        self.write_gap_before(0);
    }

    fn refresh_cps(&mut self, id: SubtitleId) {
        let timing = self.timing;
        if let Some(row) = self.rows.get_mut(id) {
            let msecs = timing.to_time(row.duration).totalmsecs();
            row.characters_per_second_text = text::characters_per_second(&row.text, msecs);
        }
    }
}
