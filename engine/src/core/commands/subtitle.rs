//! Subtitle Commands Module
//!
//! Implements the undoable subtitle edits: field writes, timing writes,
//! whole-row replacement, insertion, batch removal and reordering.

use serde::Serialize;

use crate::core::{
    commands::{Command, CommandResult, StateChange},
    model::{DocumentModel, FieldKind, FieldValue, RemovedRow, SubtitleField, SubtitleRow},
    CoreError, CoreResult, SubtitleId,
};

fn field_change(id: SubtitleId, kind: FieldKind) -> StateChange {
    match kind {
        FieldKind::Timing => StateChange::SubtitleTimeChanged { id },
        FieldKind::Text => StateChange::SubtitleTextChanged { id },
        FieldKind::Attribute => StateChange::SubtitleModified { id },
    }
}

fn row_changes(id: SubtitleId) -> CommandResult {
    CommandResult::new()
        .with_change(StateChange::SubtitleTimeChanged { id })
        .with_change(StateChange::SubtitleTextChanged { id })
        .with_change(StateChange::SubtitleModified { id })
}

// =============================================================================
// SetSubtitleFieldCommand
// =============================================================================

/// Writes one persisted field of a subtitle.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSubtitleFieldCommand {
    pub id: SubtitleId,
    pub field: SubtitleField,
    pub value: FieldValue,
    #[serde(skip)]
    previous: Option<FieldValue>,
}

impl SetSubtitleFieldCommand {
    pub fn new(id: SubtitleId, field: SubtitleField, value: FieldValue) -> Self {
        Self {
            id,
            field,
            value,
            previous: None,
        }
    }
}

impl Command for SetSubtitleFieldCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let previous = model.subtitles.row(self.id)?.get(self.field);
        let kind = model
            .subtitles
            .set_field(self.id, self.field, self.value.clone())?;
        self.previous = Some(previous);

        Ok(CommandResult::new().with_change(field_change(self.id, kind)))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| CoreError::Internal("SetSubtitleField restored before execute".into()))?;
        let kind = model.subtitles.set_field(self.id, self.field, previous)?;

        Ok(CommandResult::new().with_change(field_change(self.id, kind)))
    }

    fn type_name(&self) -> &'static str {
        "SetSubtitleField"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// =============================================================================
// SetSubtitleTimesCommand
// =============================================================================

/// Writes start and end together (values in the storage unit).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSubtitleTimesCommand {
    pub id: SubtitleId,
    pub start: i64,
    pub end: i64,
    #[serde(skip)]
    previous: Option<(i64, i64)>,
}

impl SetSubtitleTimesCommand {
    pub fn new(id: SubtitleId, start: i64, end: i64) -> Self {
        Self {
            id,
            start,
            end,
            previous: None,
        }
    }
}

impl Command for SetSubtitleTimesCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let row = model.subtitles.row(self.id)?;
        let previous = (row.start, row.end);
        model.subtitles.set_times(self.id, self.start, self.end)?;
        self.previous = Some(previous);

        Ok(CommandResult::new().with_change(StateChange::SubtitleTimeChanged { id: self.id }))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let (start, end) = self
            .previous
            .ok_or_else(|| CoreError::Internal("SetSubtitleTimes restored before execute".into()))?;
        model.subtitles.set_times(self.id, start, end)?;

        Ok(CommandResult::new().with_change(StateChange::SubtitleTimeChanged { id: self.id }))
    }

    fn type_name(&self) -> &'static str {
        "SetSubtitleTimes"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// =============================================================================
// SetSubtitleDataCommand
// =============================================================================

/// Replaces every persisted field of a subtitle at once.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSubtitleDataCommand {
    pub id: SubtitleId,
    pub row: SubtitleRow,
    #[serde(skip)]
    previous: Option<SubtitleRow>,
}

impl SetSubtitleDataCommand {
    pub fn new(id: SubtitleId, row: SubtitleRow) -> Self {
        Self {
            id,
            row,
            previous: None,
        }
    }
}

impl Command for SetSubtitleDataCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let previous = model.subtitles.row(self.id)?.clone();
        model.subtitles.replace_persisted(self.id, &self.row)?;
        self.previous = Some(previous);

        Ok(row_changes(self.id))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| CoreError::Internal("SetSubtitleData restored before execute".into()))?;
        model.subtitles.replace_persisted(self.id, previous)?;

        Ok(row_changes(self.id))
    }

    fn type_name(&self) -> &'static str {
        "SetSubtitleData"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// =============================================================================
// InsertSubtitlesCommand
// =============================================================================

/// Inserts rows into reserved slots at given positions.
#[derive(Clone, Debug)]
pub struct InsertSubtitlesCommand {
    entries: Vec<RemovedRow>,
}

impl InsertSubtitlesCommand {
    /// `entries` positions are applied in ascending order
    pub fn new(entries: Vec<RemovedRow>) -> Self {
        Self { entries }
    }

    pub fn single(position: usize, id: SubtitleId, row: SubtitleRow) -> Self {
        Self::new(vec![RemovedRow {
            position,
            id,
            value: row,
        }])
    }

    pub fn ids(&self) -> Vec<SubtitleId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }
}

impl Command for InsertSubtitlesCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let ids = model.subtitles.insert_rows(self.entries.clone())?;
        Ok(CommandResult::new().with_change(StateChange::SubtitlesInserted { ids }))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let ids = self.ids();
        self.entries = model.subtitles.remove_rows(&ids)?;
        Ok(CommandResult::new().with_change(StateChange::SubtitlesDeleted { ids }))
    }

    fn type_name(&self) -> &'static str {
        "InsertSubtitles"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "entries": self
                .entries
                .iter()
                .map(|entry| serde_json::json!({ "position": entry.position, "id": entry.id }))
                .collect::<Vec<_>>(),
        })
    }
}

// =============================================================================
// RemoveSubtitlesCommand
// =============================================================================

/// Removes a batch of rows; restoring puts them back at their positions.
#[derive(Clone, Debug)]
pub struct RemoveSubtitlesCommand {
    ids: Vec<SubtitleId>,
    removed: Vec<RemovedRow>,
}

impl RemoveSubtitlesCommand {
    pub fn new(ids: Vec<SubtitleId>) -> Self {
        Self {
            ids,
            removed: Vec::new(),
        }
    }
}

impl Command for RemoveSubtitlesCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        self.removed = model.subtitles.remove_rows(&self.ids)?;
        let ids = self.removed.iter().map(|entry| entry.id).collect();
        Ok(CommandResult::new().with_change(StateChange::SubtitlesDeleted { ids }))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let ids = model
            .subtitles
            .insert_rows(std::mem::take(&mut self.removed))?;
        Ok(CommandResult::new().with_change(StateChange::SubtitlesInserted { ids }))
    }

    fn type_name(&self) -> &'static str {
        "RemoveSubtitles"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "ids": self.ids })
    }
}

// =============================================================================
// ReorderSubtitlesCommand
// =============================================================================

/// Applies a new document order (a permutation of the current one).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSubtitlesCommand {
    pub order: Vec<SubtitleId>,
    #[serde(skip)]
    previous: Vec<SubtitleId>,
}

impl ReorderSubtitlesCommand {
    pub fn new(order: Vec<SubtitleId>) -> Self {
        Self {
            order,
            previous: Vec::new(),
        }
    }
}

impl Command for ReorderSubtitlesCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let previous = model.subtitles.ids().to_vec();
        model.subtitles.reorder(self.order.clone())?;
        self.previous = previous;
        Ok(CommandResult::new().with_change(StateChange::SubtitlesReordered))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        model.subtitles.reorder(self.previous.clone())?;
        Ok(CommandResult::new().with_change(StateChange::SubtitlesReordered))
    }

    fn type_name(&self) -> &'static str {
        "ReorderSubtitles"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_rows(count: usize) -> (DocumentModel, Vec<SubtitleId>) {
        let mut model = DocumentModel::default();
        let mut ids = Vec::new();
        for index in 0..count {
            let id = model.subtitles.allocate_id();
            let mut row = SubtitleRow::default();
            let start = index as i64 * 1000;
            row.put_times(start, start + 500);
            row.text = format!("line {index}");
            InsertSubtitlesCommand::single(index, id, row)
                .execute(&mut model)
                .unwrap();
            ids.push(id);
        }
        (model, ids)
    }

    fn snapshot(model: &DocumentModel) -> Vec<SubtitleRow> {
        model.subtitles.iter().map(|(_, row)| row.clone()).collect()
    }

    #[test]
    fn test_set_field_restores_previous_value() {
        let (mut model, ids) = model_with_rows(2);
        let before = snapshot(&model);

        let mut cmd = SetSubtitleFieldCommand::new(ids[0], SubtitleField::End, FieldValue::Integer(900));
        let result = cmd.execute(&mut model).unwrap();
        assert_eq!(
            result.changes,
            vec![StateChange::SubtitleTimeChanged { id: ids[0] }]
        );
        assert_eq!(model.subtitles.row(ids[1]).unwrap().gap_before, 100);

        cmd.restore(&mut model).unwrap();
        assert_eq!(snapshot(&model), before);
    }

    #[test]
    fn test_set_field_on_unknown_handle_fails() {
        let (mut model, _) = model_with_rows(1);
        let ghost = model.subtitles.allocate_id();
        let mut cmd = SetSubtitleFieldCommand::new(ghost, SubtitleField::Text, "x".into());
        assert!(matches!(
            cmd.execute(&mut model),
            Err(CoreError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_set_times_round_trip() {
        let (mut model, ids) = model_with_rows(1);
        let mut cmd = SetSubtitleTimesCommand::new(ids[0], 1000, 3000);
        cmd.execute(&mut model).unwrap();
        assert_eq!(model.subtitles.row(ids[0]).unwrap().duration, 2000);

        cmd.restore(&mut model).unwrap();
        let row = model.subtitles.row(ids[0]).unwrap();
        assert_eq!((row.start, row.end, row.duration), (0, 500, 500));
    }

    #[test]
    fn test_remove_restores_original_positions() {
        let (mut model, ids) = model_with_rows(5);
        let before = snapshot(&model);

        let mut cmd = RemoveSubtitlesCommand::new(vec![ids[3], ids[0], ids[1]]);
        let result = cmd.execute(&mut model).unwrap();
        assert_eq!(model.subtitles.len(), 2);
        assert_eq!(
            result.changes,
            vec![StateChange::SubtitlesDeleted {
                ids: vec![ids[0], ids[1], ids[3]]
            }]
        );

        cmd.restore(&mut model).unwrap();
        assert_eq!(snapshot(&model), before);

        cmd.execute(&mut model).unwrap();
        assert_eq!(model.subtitles.ids(), &[ids[2], ids[4]]);
    }

    #[test]
    fn test_reorder_and_restore() {
        let (mut model, ids) = model_with_rows(3);
        let before = snapshot(&model);

        let mut cmd = ReorderSubtitlesCommand::new(vec![ids[2], ids[0], ids[1]]);
        cmd.execute(&mut model).unwrap();
        assert_eq!(model.subtitles.row(ids[2]).unwrap().num, 1);
        assert_eq!(model.subtitles.row(ids[2]).unwrap().gap_after, -2500);

        cmd.restore(&mut model).unwrap();
        assert_eq!(snapshot(&model), before);
    }

    #[test]
    fn test_insert_restore_then_redo() {
        let (mut model, _) = model_with_rows(2);
        let id = model.subtitles.allocate_id();
        let mut cmd = InsertSubtitlesCommand::single(1, id, SubtitleRow::default());

        cmd.execute(&mut model).unwrap();
        assert_eq!(model.subtitles.position(id).unwrap(), 1);
        cmd.restore(&mut model).unwrap();
        assert!(!model.subtitles.contains(id));
        cmd.execute(&mut model).unwrap();
        assert_eq!(model.subtitles.position(id).unwrap(), 1);
    }

    #[test]
    fn test_set_data_replaces_everything() {
        let (mut model, ids) = model_with_rows(1);
        let mut row = SubtitleRow::default();
        row.put_times(100, 200);
        row.text = "new".to_string();
        row.note = "checked".to_string();

        let mut cmd = SetSubtitleDataCommand::new(ids[0], row);
        cmd.execute(&mut model).unwrap();
        let stored = model.subtitles.row(ids[0]).unwrap();
        assert_eq!((stored.text.as_str(), stored.note.as_str()), ("new", "checked"));
        assert_eq!(stored.num, 1);

        cmd.restore(&mut model).unwrap();
        assert_eq!(model.subtitles.row(ids[0]).unwrap().text, "line 0");
    }
}
