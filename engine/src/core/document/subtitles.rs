//! Subtitles Collection
//!
//! Ordered views over a document's subtitles: `Subtitles` for navigation,
//! lookup and selection queries, `SubtitlesMut` for structural edits and
//! selection changes.

use tracing::debug;

use crate::core::{
    commands::{
        InsertSubtitlesCommand, RemoveSubtitlesCommand, ReorderSubtitlesCommand, StateChange,
    },
    document::{Document, Subtitle},
    events::DocumentEvent,
    model::{SubtitleData, SubtitleRow},
    time::SubtitleTime,
    CoreResult, SubtitleId,
};

// =============================================================================
// Read View
// =============================================================================

#[derive(Clone, Copy)]
pub struct Subtitles<'a> {
    document: &'a Document,
}

impl<'a> Subtitles<'a> {
    pub(crate) fn new(document: &'a Document) -> Self {
        Self { document }
    }

    fn handle(&self, id: SubtitleId) -> Option<Subtitle<'a>> {
        Subtitle::new(self.document, id).ok()
    }

    pub fn size(&self) -> usize {
        self.document.model().subtitles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Subtitle by 1-based sequence number
    pub fn get(&self, num: usize) -> Option<Subtitle<'a>> {
        let position = num.checked_sub(1)?;
        let id = self.document.model().subtitles.id_at(position)?;
        self.handle(id)
    }

    pub fn get_first(&self) -> Option<Subtitle<'a>> {
        self.get(1)
    }

    pub fn get_last(&self) -> Option<Subtitle<'a>> {
        self.get(self.size())
    }

    /// Previous subtitle in document order
    pub fn get_previous(&self, id: SubtitleId) -> Option<Subtitle<'a>> {
        let num = self.handle(id)?.num();
        self.get(num - 1)
    }

    /// Next subtitle in document order
    pub fn get_next(&self, id: SubtitleId) -> Option<Subtitle<'a>> {
        let num = self.handle(id)?.num();
        self.get(num + 1)
    }

    /// Every subtitle, in document order
    pub fn iter(&self) -> impl Iterator<Item = Subtitle<'a>> + 'a {
        let document = self.document;
        document
            .model()
            .subtitles
            .ids()
            .iter()
            .filter_map(move |id| Subtitle::new(document, *id).ok())
    }

    /// First subtitle, in document order, whose `[start, end]` contains `time`
    pub fn find(&self, time: SubtitleTime) -> Option<Subtitle<'a>> {
        self.iter()
            .find(|sub| sub.start() <= time && time <= sub.end())
    }

    /// Selected subtitles, in document order
    pub fn get_selection(&self) -> Vec<Subtitle<'a>> {
        self.iter()
            .filter(|sub| self.document.is_selected(sub.id()))
            .collect()
    }

    pub fn is_selected(&self, id: SubtitleId) -> bool {
        self.document.is_selected(id)
    }
}

// =============================================================================
// Mutable View
// =============================================================================

pub struct SubtitlesMut<'a> {
    document: &'a mut Document,
}

impl<'a> SubtitlesMut<'a> {
    pub(crate) fn new(document: &'a mut Document) -> Self {
        Self { document }
    }

    /// Read view of the current state
    pub fn get_ref(&self) -> Subtitles<'_> {
        Subtitles::new(&*self.document)
    }

    fn insert_at(&mut self, position: usize, row: SubtitleRow) -> CoreResult<SubtitleId> {
        let id = self.document.model_mut().subtitles.allocate_id();
        self.document
            .apply(Box::new(InsertSubtitlesCommand::single(position, id, row)))?;
        Ok(id)
    }

    /// Appends an empty subtitle at the end
    pub fn append(&mut self) -> CoreResult<SubtitleId> {
        let position = self.document.model().subtitles.len();
        self.insert_at(position, SubtitleRow::default())
    }

    /// Appends a subtitle holding `data`
    pub fn append_with(&mut self, data: &SubtitleData) -> CoreResult<SubtitleId> {
        let position = self.document.model().subtitles.len();
        let row = self.document.model().subtitles.row_from_data(data);
        self.insert_at(position, row)
    }

    /// Inserts an empty subtitle right before `id`
    pub fn insert_before(&mut self, id: SubtitleId) -> CoreResult<SubtitleId> {
        let position = self.document.model().subtitles.position(id)?;
        self.insert_at(position, SubtitleRow::default())
    }

    /// Inserts an empty subtitle right after `id`
    pub fn insert_after(&mut self, id: SubtitleId) -> CoreResult<SubtitleId> {
        let position = self.document.model().subtitles.position(id)? + 1;
        self.insert_at(position, SubtitleRow::default())
    }

    /// Removes a batch as one command with one notification.
    ///
    /// Fails without removing anything if any id is invalid.
    pub fn remove(&mut self, ids: &[SubtitleId]) -> CoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .document
            .apply(Box::new(RemoveSubtitlesCommand::new(ids.to_vec())))?;
        let removed = result
            .changes
            .iter()
            .map(|change| match change {
                StateChange::SubtitlesDeleted { ids } => ids.len(),
                _ => 0,
            })
            .sum();
        Ok(removed)
    }

    /// Stable-sorts by start time as one reorder command.
    ///
    /// Returns how many subtitles changed position; nothing is recorded when
    /// the collection is already sorted.
    pub fn sort_by_time(&mut self) -> CoreResult<usize> {
        let model = &self.document.model().subtitles;
        let current: Vec<SubtitleId> = model.ids().to_vec();
        let mut sorted = current.clone();
        sorted.sort_by_key(|id| model.get(*id).map(|row| row.start).unwrap_or_default());

        let moved = current
            .iter()
            .zip(sorted.iter())
            .filter(|(before, after)| before != after)
            .count();
        if moved == 0 {
            debug!("Subtitles already sorted by time");
            return Ok(0);
        }

        self.document
            .apply(Box::new(ReorderSubtitlesCommand::new(sorted)))?;
        Ok(moved)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select(&mut self, ids: &[SubtitleId]) -> CoreResult<()> {
        for id in ids {
            self.document.model().subtitles.row(*id)?;
        }
        let changed = ids
            .iter()
            .fold(false, |changed, id| self.document.selection_mut().insert(*id) || changed);
        self.selection_changed(changed);
        Ok(())
    }

    pub fn unselect(&mut self, ids: &[SubtitleId]) {
        let changed = ids
            .iter()
            .fold(false, |changed, id| self.document.selection_mut().remove(id) || changed);
        self.selection_changed(changed);
    }

    pub fn select_all(&mut self) {
        let ids: Vec<SubtitleId> = self.document.model().subtitles.ids().to_vec();
        let selection = self.document.selection_mut();
        let before = selection.len();
        selection.extend(ids);
        let changed = selection.len() != before;
        self.selection_changed(changed);
    }

    pub fn unselect_all(&mut self) {
        let selection = self.document.selection_mut();
        let changed = !selection.is_empty();
        selection.clear();
        self.selection_changed(changed);
    }

    pub fn invert_selection(&mut self) {
        let ids: Vec<SubtitleId> = self.document.model().subtitles.ids().to_vec();
        if ids.is_empty() {
            return;
        }
        let selection = self.document.selection_mut();
        for id in ids {
            if !selection.remove(&id) {
                selection.insert(id);
            }
        }
        self.selection_changed(true);
    }

    fn selection_changed(&mut self, changed: bool) {
        if changed {
            self.document.emit(DocumentEvent::SubtitleSelectionChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoreError;

    fn document_with(times: &[(i64, i64)]) -> (Document, Vec<SubtitleId>) {
        let mut document = Document::new();
        let mut ids = Vec::new();
        for (start, end) in times {
            let data = SubtitleData::new(SubtitleTime::new(*start), SubtitleTime::new(*end), "");
            ids.push(document.subtitles_mut().append_with(&data).unwrap());
        }
        (document, ids)
    }

    fn nums(document: &Document) -> Vec<usize> {
        document.subtitles().iter().map(|sub| sub.num()).collect()
    }

    #[test]
    fn insert_before_and_after_renumber() {
        let (mut document, ids) = document_with(&[(0, 1000), (2000, 3000)]);
        let before = document.subtitles_mut().insert_before(ids[0]).unwrap();
        let after = document.subtitles_mut().insert_after(ids[0]).unwrap();

        let subtitles = document.subtitles();
        assert_eq!(nums(&document), vec![1, 2, 3, 4]);
        assert_eq!(subtitles.get(1).unwrap().id(), before);
        assert_eq!(subtitles.get(3).unwrap().id(), after);
        assert_eq!(subtitles.get_last().unwrap().id(), ids[1]);
        assert!(subtitles.get(0).is_none());
        assert!(subtitles.get(5).is_none());
    }

    #[test]
    fn navigation_follows_document_order() {
        let (document, ids) = document_with(&[(0, 1000), (2000, 3000), (4000, 5000)]);
        let subtitles = document.subtitles();

        assert_eq!(subtitles.get_first().unwrap().id(), ids[0]);
        assert_eq!(subtitles.get_next(ids[0]).unwrap().id(), ids[1]);
        assert_eq!(subtitles.get_previous(ids[1]).unwrap().id(), ids[0]);
        assert!(subtitles.get_previous(ids[0]).is_none());
        assert!(subtitles.get_next(ids[2]).is_none());
        assert_eq!(subtitles.size(), 3);
    }

    #[test]
    fn find_returns_first_match_in_document_order() {
        let (document, ids) = document_with(&[(0, 1000), (500, 1500), (2000, 3000)]);
        let subtitles = document.subtitles();

        assert_eq!(subtitles.find(SubtitleTime::new(700)).unwrap().id(), ids[0]);
        assert_eq!(subtitles.find(SubtitleTime::new(1200)).unwrap().id(), ids[1]);
        assert_eq!(subtitles.find(SubtitleTime::new(3000)).unwrap().id(), ids[2]);
        assert!(subtitles.find(SubtitleTime::new(1800)).is_none());
    }

    #[test]
    fn batch_remove_is_one_undo_unit() {
        let (mut document, ids) = document_with(&[(0, 100), (200, 300), (400, 500), (600, 700)]);
        let before: Vec<SubtitleRow> = document.subtitles().iter().map(|s| s.row().clone()).collect();

        document.start_command("Delete");
        assert_eq!(document.subtitles_mut().remove(&[ids[2], ids[0]]).unwrap(), 2);
        document.finish_command();

        assert_eq!(nums(&document), vec![1, 2]);
        assert_eq!(document.subtitle(ids[1]).unwrap().gap_before().totalmsecs(), 0);
        assert_eq!(document.subtitle(ids[1]).unwrap().gap_after().totalmsecs(), 300);
        assert_eq!(document.command_system().undo_count(), 1);

        assert!(document.undo().unwrap());
        let after: Vec<SubtitleRow> = document.subtitles().iter().map(|s| s.row().clone()).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn remove_with_invalid_handle_changes_nothing() {
        let (mut document, ids) = document_with(&[(0, 100), (200, 300)]);
        document.subtitles_mut().remove(&[ids[0]]).unwrap();

        let result = document.subtitles_mut().remove(&[ids[1], ids[0]]);
        assert!(matches!(result, Err(CoreError::InvalidHandle(_))));
        assert_eq!(document.subtitles().size(), 1);
    }

    #[test]
    fn sort_by_time_counts_moves_and_undoes() {
        let (mut document, ids) = document_with(&[(3000, 4000), (0, 1000), (1000, 2000), (5000, 6000)]);

        document.start_command("Sort");
        assert_eq!(document.subtitles_mut().sort_by_time().unwrap(), 3);
        document.finish_command();

        let order: Vec<SubtitleId> = document.subtitles().iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0], ids[3]]);
        assert_eq!(nums(&document), vec![1, 2, 3, 4]);

        document.start_command("Sort again");
        assert_eq!(document.subtitles_mut().sort_by_time().unwrap(), 0);
        document.finish_command();
        assert_eq!(document.command_system().undo_count(), 1);

        document.undo().unwrap();
        let order: Vec<SubtitleId> = document.subtitles().iter().map(|s| s.id()).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn sort_is_stable_for_equal_starts() {
        let (mut document, ids) = document_with(&[(1000, 2000), (0, 500), (1000, 1500)]);
        document.subtitles_mut().sort_by_time().unwrap();
        let order: Vec<SubtitleId> = document.subtitles().iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn selection_is_ordered_and_pruned_on_remove() {
        let (mut document, ids) = document_with(&[(0, 100), (200, 300), (400, 500)]);
        document.subtitles_mut().select(&[ids[2], ids[0]]).unwrap();

        let selected: Vec<SubtitleId> =
            document.subtitles().get_selection().iter().map(|s| s.id()).collect();
        assert_eq!(selected, vec![ids[0], ids[2]]);

        document.subtitles_mut().invert_selection();
        assert!(document.subtitles().is_selected(ids[1]));
        assert!(!document.subtitles().is_selected(ids[0]));

        document.subtitles_mut().select_all();
        document.subtitles_mut().remove(&[ids[1]]).unwrap();
        assert_eq!(document.subtitles().get_selection().len(), 2);

        document.subtitles_mut().unselect(&[ids[0]]);
        document.subtitles_mut().unselect_all();
        assert!(document.subtitles().get_selection().is_empty());
    }

    #[test]
    fn selecting_invalid_handle_fails() {
        let (mut document, ids) = document_with(&[(0, 100)]);
        document.subtitles_mut().remove(&ids).unwrap();
        assert!(document.subtitles_mut().select(&ids).is_err());
    }
}
