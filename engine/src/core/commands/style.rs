//! Style Commands Module
//!
//! Undoable insertion, removal and field edits of style records.

use serde::Serialize;

use crate::core::{
    commands::{Command, CommandResult, StateChange},
    model::{DocumentModel, FieldValue, RemovedStyle, StyleField, StyleRecord},
    CoreError, CoreResult, StyleId,
};

// =============================================================================
// InsertStyleCommand
// =============================================================================

#[derive(Clone, Debug)]
pub struct InsertStyleCommand {
    entry: Option<RemovedStyle>,
    id: StyleId,
}

impl InsertStyleCommand {
    pub fn new(position: usize, id: StyleId, record: StyleRecord) -> Self {
        Self {
            entry: Some(RemovedStyle {
                position,
                id,
                value: record,
            }),
            id,
        }
    }
}

impl Command for InsertStyleCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let entry = self
            .entry
            .clone()
            .ok_or_else(|| CoreError::Internal("InsertStyle has no record to insert".into()))?;
        let ids = model.styles.insert_records(vec![entry])?;
        Ok(CommandResult::new().with_change(StateChange::StylesInserted { ids }))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        self.entry = model.styles.remove_records(&[self.id])?.into_iter().next();
        Ok(CommandResult::new().with_change(StateChange::StylesDeleted { ids: vec![self.id] }))
    }

    fn type_name(&self) -> &'static str {
        "InsertStyle"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "position": self.entry.as_ref().map(|entry| entry.position),
        })
    }
}

// =============================================================================
// RemoveStylesCommand
// =============================================================================

#[derive(Clone, Debug)]
pub struct RemoveStylesCommand {
    ids: Vec<StyleId>,
    removed: Vec<RemovedStyle>,
}

impl RemoveStylesCommand {
    pub fn new(ids: Vec<StyleId>) -> Self {
        Self {
            ids,
            removed: Vec::new(),
        }
    }
}

impl Command for RemoveStylesCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        self.removed = model.styles.remove_records(&self.ids)?;
        let ids = self.removed.iter().map(|entry| entry.id).collect();
        Ok(CommandResult::new().with_change(StateChange::StylesDeleted { ids }))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let ids = model
            .styles
            .insert_records(std::mem::take(&mut self.removed))?;
        Ok(CommandResult::new().with_change(StateChange::StylesInserted { ids }))
    }

    fn type_name(&self) -> &'static str {
        "RemoveStyles"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "ids": self.ids })
    }
}

// =============================================================================
// SetStyleFieldCommand
// =============================================================================

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStyleFieldCommand {
    pub id: StyleId,
    pub field: StyleField,
    pub value: FieldValue,
    #[serde(skip)]
    previous: Option<FieldValue>,
}

impl SetStyleFieldCommand {
    pub fn new(id: StyleId, field: StyleField, value: FieldValue) -> Self {
        Self {
            id,
            field,
            value,
            previous: None,
        }
    }
}

impl Command for SetStyleFieldCommand {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let previous = model.styles.record(self.id)?.get(self.field);
        model
            .styles
            .set_field(self.id, self.field, self.value.clone())?;
        self.previous = Some(previous);
        Ok(CommandResult::new().with_change(StateChange::StyleModified { id: self.id }))
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| CoreError::Internal("SetStyleField restored before execute".into()))?;
        model.styles.set_field(self.id, self.field, previous)?;
        Ok(CommandResult::new().with_change(StateChange::StyleModified { id: self.id }))
    }

    fn type_name(&self) -> &'static str {
        "SetStyleField"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_and_edit_styles() {
        let mut model = DocumentModel::default();
        let default = model.styles.allocate_id();
        let mut insert = InsertStyleCommand::new(0, default, StyleRecord::default());
        insert.execute(&mut model).unwrap();

        let mut edit = SetStyleFieldCommand::new(default, StyleField::Italic, true.into());
        edit.execute(&mut model).unwrap();
        assert!(model.styles.record(default).unwrap().italic);
        edit.restore(&mut model).unwrap();
        assert!(!model.styles.record(default).unwrap().italic);

        let mut remove = RemoveStylesCommand::new(vec![default]);
        remove.execute(&mut model).unwrap();
        assert!(model.styles.is_empty());
        remove.restore(&mut model).unwrap();
        assert_eq!(model.styles.find_by_name("Default"), Some(default));

        insert.restore(&mut model).unwrap();
        assert!(model.styles.is_empty());
        insert.execute(&mut model).unwrap();
        assert_eq!(model.styles.len(), 1);
    }
}
