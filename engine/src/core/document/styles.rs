//! Styles Collection
//!
//! Ordered views over a document's styles.

use crate::core::{
    commands::{InsertStyleCommand, RemoveStylesCommand, SetStyleFieldCommand, StateChange},
    document::Document,
    model::{FieldValue, StyleField, StyleRecord},
    CoreResult, StyleId,
};

/// Read-only view of one style
#[derive(Clone, Copy, Debug)]
pub struct Style<'a> {
    id: StyleId,
    record: &'a StyleRecord,
}

impl<'a> Style<'a> {
    pub fn id(&self) -> StyleId {
        self.id
    }

    pub fn num(&self) -> usize {
        self.record.num
    }

    pub fn name(&self) -> &'a str {
        &self.record.name
    }

    pub fn record(&self) -> &'a StyleRecord {
        self.record
    }

    pub fn get(&self, field: StyleField) -> FieldValue {
        self.record.get(field)
    }
}

#[derive(Clone, Copy)]
pub struct Styles<'a> {
    document: &'a Document,
}

impl<'a> Styles<'a> {
    pub(crate) fn new(document: &'a Document) -> Self {
        Self { document }
    }

    fn handle(&self, id: StyleId) -> Option<Style<'a>> {
        let record = self.document.model().styles.get(id)?;
        Some(Style { id, record })
    }

    pub fn size(&self) -> usize {
        self.document.model().styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn style(&self, id: StyleId) -> CoreResult<Style<'a>> {
        let record = self.document.model().styles.record(id)?;
        Ok(Style { id, record })
    }

    /// Style by 1-based sequence number
    pub fn get(&self, num: usize) -> Option<Style<'a>> {
        let id = self.document.model().styles.id_at(num.checked_sub(1)?)?;
        self.handle(id)
    }

    pub fn get_first(&self) -> Option<Style<'a>> {
        self.get(1)
    }

    pub fn get_last(&self) -> Option<Style<'a>> {
        self.get(self.size())
    }

    pub fn find_by_name(&self, name: &str) -> Option<Style<'a>> {
        let id = self.document.model().styles.find_by_name(name)?;
        self.handle(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = Style<'a>> + 'a {
        self.document
            .model()
            .styles
            .iter()
            .map(|(id, record)| Style { id, record })
    }
}

pub struct StylesMut<'a> {
    document: &'a mut Document,
}

impl<'a> StylesMut<'a> {
    pub(crate) fn new(document: &'a mut Document) -> Self {
        Self { document }
    }

    fn insert_at(&mut self, position: usize, record: StyleRecord) -> CoreResult<StyleId> {
        let id = self.document.model_mut().styles.allocate_id();
        self.document
            .apply(Box::new(InsertStyleCommand::new(position, id, record)))?;
        Ok(id)
    }

    /// Appends a default style with the given name
    pub fn append(&mut self, name: &str) -> CoreResult<StyleId> {
        self.append_with(StyleRecord::named(name))
    }

    pub fn append_with(&mut self, record: StyleRecord) -> CoreResult<StyleId> {
        let position = self.document.model().styles.len();
        self.insert_at(position, record)
    }

    pub fn insert_after(&mut self, id: StyleId, record: StyleRecord) -> CoreResult<StyleId> {
        let position = self.document.model().styles.position(id)? + 1;
        self.insert_at(position, record)
    }

    /// Removes a batch as one command; returns how many were removed
    pub fn remove(&mut self, ids: &[StyleId]) -> CoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .document
            .apply(Box::new(RemoveStylesCommand::new(ids.to_vec())))?;
        Ok(result
            .changes
            .iter()
            .map(|change| match change {
                StateChange::StylesDeleted { ids } => ids.len(),
                _ => 0,
            })
            .sum())
    }

    pub fn set(&mut self, id: StyleId, field: StyleField, value: FieldValue) -> CoreResult<()> {
        self.document
            .apply(Box::new(SetStyleFieldCommand::new(id, field, value)))
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::DocumentEvent;
    use std::sync::{Arc, Mutex};

    #[test]
    fn styles_are_ordered_and_undoable() {
        let mut document = Document::new();
        let default = document.styles_mut().append("Default").unwrap();
        let top = document.styles_mut().append("Top").unwrap();
        let middle = document
            .styles_mut()
            .insert_after(default, StyleRecord::named("Middle"))
            .unwrap();

        let names: Vec<&str> = document.styles().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Default", "Middle", "Top"]);
        assert_eq!(document.styles().get(3).unwrap().id(), top);
        assert_eq!(document.styles().find_by_name("Middle").unwrap().num(), 2);

        document.start_command("Remove styles");
        assert_eq!(document.styles_mut().remove(&[top, middle]).unwrap(), 2);
        document.finish_command();
        assert_eq!(document.styles().size(), 1);

        document.undo().unwrap();
        assert_eq!(document.styles().get_last().unwrap().id(), top);
    }

    #[test]
    fn style_field_edits_emit_style_changed() {
        let mut document = Document::new();
        let id = document.styles_mut().append("Default").unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        document.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        document
            .styles_mut()
            .set(id, "font-size".parse().unwrap(), FieldValue::Decimal(32.0))
            .unwrap();

        assert_eq!(
            document.styles().style(id).unwrap().record().font_size,
            32.0
        );
        assert_eq!(
            *events.lock().unwrap(),
            vec![DocumentEvent::StyleChanged { id }]
        );
    }
}
