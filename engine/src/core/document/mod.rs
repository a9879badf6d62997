//! Document Module
//!
//! A `Document` owns the subtitle and style model, the command history,
//! the selection and the listeners. All edits go through commands so the
//! history and the notifications stay consistent.

mod styles;
mod subtitle;
mod subtitles;

pub use styles::*;
pub use subtitle::*;
pub use subtitles::*;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::{
    commands::{Command, CommandResult, CommandSystem, StateChange},
    events::{DocumentEvent, EventBus},
    formats::FormatRegistry,
    model::{DocumentModel, TimingContext},
    settings::{AppSettings, TimingSettings},
    time::FrameRate,
    CoreResult, Newline, OpId, SubscriptionId, SubtitleId, TimingMode,
};

/// One open subtitle file and its editing state
pub struct Document {
    model: DocumentModel,
    commands: CommandSystem,
    events: EventBus,
    selection: HashSet<SubtitleId>,

    filename: Option<PathBuf>,
    name: String,
    format: String,
    charset: String,
    newline: Newline,

    edit_timing_mode: TimingMode,
    timing_settings: TimingSettings,
    changed: bool,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("subtitles", &self.model.subtitles.len())
            .field("styles", &self.model.styles.len())
            .field("changed", &self.changed)
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with default settings
    pub fn new() -> Self {
        Self::with_settings(&AppSettings::default())
    }

    /// Creates an empty document from editor settings
    pub fn with_settings(settings: &AppSettings) -> Self {
        let editor = &settings.editor;
        let timing = TimingContext::new(editor.default_timing_mode, editor.default_framerate);
        Self {
            model: DocumentModel::new(timing),
            commands: CommandSystem::new().with_max_undo_depth(editor.max_undo_depth),
            events: EventBus::new(),
            selection: HashSet::new(),
            filename: None,
            name: String::new(),
            format: settings.document.default_format.clone(),
            charset: settings.document.default_charset.clone(),
            newline: settings.document.default_newline,
            edit_timing_mode: editor.default_edit_timing_mode,
            timing_settings: settings.timing.clone(),
            changed: false,
        }
    }

    /// Creates a document with the same metadata and settings as `other`.
    ///
    /// Subtitles and styles are copied only when `copy_content` is set.
    /// History, selection and listeners are never copied.
    pub fn duplicate(other: &Document, copy_content: bool) -> Self {
        let model = if copy_content {
            other.model.clone()
        } else {
            DocumentModel::new(other.model.subtitles.timing())
        };
        let mut commands = CommandSystem::new();
        commands.set_max_undo_depth(other.commands.max_undo_depth());
        Self {
            model,
            commands,
            events: EventBus::new(),
            selection: HashSet::new(),
            filename: other.filename.clone(),
            name: other.name.clone(),
            format: other.format.clone(),
            charset: other.charset.clone(),
            newline: other.newline,
            edit_timing_mode: other.edit_timing_mode,
            timing_settings: other.timing_settings.clone(),
            changed: false,
        }
    }

    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut DocumentModel {
        &mut self.model
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Runs a command against the model, recording it when a group is open,
    /// and notifies listeners of the resulting changes
    pub(crate) fn apply(&mut self, mut command: Box<dyn Command>) -> CoreResult<CommandResult> {
        let result = if self.commands.is_recording() {
            self.commands
                .add(command, &mut self.model)?
                .unwrap_or_default()
        } else {
            command.execute(&mut self.model)?
        };
        self.dispatch(&result);
        Ok(result)
    }

    fn dispatch(&mut self, result: &CommandResult) {
        for change in &result.changes {
            if let StateChange::SubtitlesDeleted { ids } = change {
                let before = self.selection.len();
                for id in ids {
                    self.selection.remove(id);
                }
                if self.selection.len() != before {
                    self.events.emit(&DocumentEvent::SubtitleSelectionChanged);
                }
            }
            self.events.emit(&DocumentEvent::from(change.clone()));
        }
    }

    pub(crate) fn emit(&mut self, event: DocumentEvent) {
        self.events.emit(&event);
    }

    /// Opens a command group; see [`CommandSystem::start`]
    pub fn start_command(&mut self, description: impl Into<String>) -> bool {
        self.commands.start(description)
    }

    /// Executes and records a command in the open group
    pub fn add_command(&mut self, command: Box<dyn Command>) -> CoreResult<Option<CommandResult>> {
        if !self.commands.is_recording() {
            warn!(
                command = command.type_name(),
                "No command group open, command discarded"
            );
            return Ok(None);
        }
        self.apply(command).map(Some)
    }

    /// Closes the open group. A committed group marks the document changed.
    pub fn finish_command(&mut self) -> Option<OpId> {
        let op_id = self.commands.finish()?;
        self.changed = true;
        self.events.emit(&DocumentEvent::DocumentChanged);
        self.events.emit(&DocumentEvent::HistoryChanged);
        Some(op_id)
    }

    /// Reverts the last committed group. Returns false if nothing was undone.
    pub fn undo(&mut self) -> CoreResult<bool> {
        let Some(result) = self.commands.undo(&mut self.model)? else {
            return Ok(false);
        };
        self.after_history_step(&result);
        Ok(true)
    }

    /// Reapplies the last undone group. Returns false if nothing was redone.
    pub fn redo(&mut self) -> CoreResult<bool> {
        let Some(result) = self.commands.redo(&mut self.model)? else {
            return Ok(false);
        };
        self.after_history_step(&result);
        Ok(true)
    }

    fn after_history_step(&mut self, result: &CommandResult) {
        self.dispatch(result);
        self.changed = true;
        self.events.emit(&DocumentEvent::DocumentChanged);
        self.events.emit(&DocumentEvent::HistoryChanged);
    }

    pub fn command_system(&self) -> &CommandSystem {
        &self.commands
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn subtitle(&self, id: SubtitleId) -> CoreResult<Subtitle<'_>> {
        Subtitle::new(self, id)
    }

    pub fn subtitle_mut(&mut self, id: SubtitleId) -> CoreResult<SubtitleMut<'_>> {
        SubtitleMut::new(self, id)
    }

    pub fn subtitles(&self) -> Subtitles<'_> {
        Subtitles::new(self)
    }

    pub fn subtitles_mut(&mut self) -> SubtitlesMut<'_> {
        SubtitlesMut::new(self)
    }

    pub fn styles(&self) -> Styles<'_> {
        Styles::new(self)
    }

    pub fn styles_mut(&mut self) -> StylesMut<'_> {
        StylesMut::new(self)
    }

    pub fn is_selected(&self, id: SubtitleId) -> bool {
        self.selection.contains(&id)
    }

    pub(crate) fn selection_mut(&mut self) -> &mut HashSet<SubtitleId> {
        &mut self.selection
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&DocumentEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // =========================================================================
    // Timing
    // =========================================================================

    pub fn timing_mode(&self) -> TimingMode {
        self.model.subtitles.timing().mode
    }

    /// Changes the storage unit, converting every stored value.
    ///
    /// Not undoable: the history is cleared. Refused while a command group
    /// is open. Returns true if the mode changed.
    pub fn set_timing_mode(&mut self, mode: TimingMode) -> bool {
        if self.commands.is_recording() {
            warn!(?mode, "Timing mode change refused while a command group is open");
            return false;
        }
        let timing = self.model.subtitles.timing();
        if timing.mode == mode {
            return false;
        }

        self.model
            .subtitles
            .set_timing(TimingContext::new(mode, timing.framerate));
        self.commands.clear();
        info!(?mode, subtitles = self.model.subtitles.len(), "Timing mode changed");

        self.events.emit(&DocumentEvent::TimingModeChanged { mode });
        self.events.emit(&DocumentEvent::HistoryChanged);
        true
    }

    pub fn edit_timing_mode(&self) -> TimingMode {
        self.edit_timing_mode
    }

    pub fn set_edit_timing_mode(&mut self, mode: TimingMode) {
        if self.edit_timing_mode == mode {
            return;
        }
        self.edit_timing_mode = mode;
        self.events.emit(&DocumentEvent::EditTimingModeChanged { mode });
    }

    pub fn framerate(&self) -> FrameRate {
        self.model.subtitles.timing().framerate
    }

    /// Changes the framerate. Stored values are kept as they are, so in
    /// frame mode the displayed times move while frame numbers stay put.
    pub fn set_framerate(&mut self, framerate: FrameRate) {
        let timing = self.model.subtitles.timing();
        if timing.framerate == framerate {
            return;
        }
        self.model
            .subtitles
            .set_timing(TimingContext::new(timing.mode, framerate));
        debug!(framerate = framerate.label(), "Framerate changed");
        self.events.emit(&DocumentEvent::FramerateChanged { framerate });
    }

    pub fn timing_settings(&self) -> &TimingSettings {
        &self.timing_settings
    }

    pub fn set_timing_settings(&mut self, settings: TimingSettings) {
        self.timing_settings = settings;
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
        self.property_changed("filename");
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.property_changed("name");
    }

    /// Name of the format used to save
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
        self.property_changed("format");
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn set_charset(&mut self, charset: impl Into<String>) {
        self.charset = charset.into();
        self.property_changed("charset");
    }

    pub fn newline(&self) -> Newline {
        self.newline
    }

    pub fn set_newline(&mut self, newline: Newline) {
        self.newline = newline;
        self.property_changed("newline");
    }

    fn property_changed(&mut self, property: &str) {
        self.events.emit(&DocumentEvent::DocumentPropertyChanged {
            property: property.to_string(),
        });
    }

    /// True when there are edits not yet saved
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    /// Writes the document with its current format and marks it clean
    pub fn save(&mut self, registry: &FormatRegistry, path: &Path) -> CoreResult<()> {
        registry.save(self, path)?;
        self.filename = Some(path.to_path_buf());
        self.changed = false;
        info!(path = %path.display(), format = %self.format, "Document saved");
        self.property_changed("filename");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::SubtitleTime;
    use std::sync::{Arc, Mutex};

    fn recorder(document: &mut Document) -> Arc<Mutex<Vec<&'static str>>> {
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = names.clone();
        document.subscribe(move |event| sink.lock().unwrap().push(event.name()));
        names
    }

    #[test]
    fn committed_group_marks_changed_once() {
        let mut document = Document::new();
        let names = recorder(&mut document);

        assert!(document.start_command("Add"));
        let id = document.subtitles_mut().append().unwrap();
        document
            .subtitle_mut(id)
            .unwrap()
            .set_text("hello")
            .unwrap();
        assert!(!document.is_changed());
        assert!(document.finish_command().is_some());
        assert!(document.is_changed());

        assert_eq!(
            *names.lock().unwrap(),
            vec![
                "subtitle-inserted",
                "subtitle-text-changed",
                "document-changed",
                "history-changed"
            ]
        );
    }

    #[test]
    fn empty_group_does_not_mark_changed() {
        let mut document = Document::new();
        let names = recorder(&mut document);
        document.start_command("Nothing");
        assert!(document.finish_command().is_none());
        assert!(!document.is_changed());
        assert!(names.lock().unwrap().is_empty());
    }

    #[test]
    fn add_command_while_idle_is_ignored() {
        let mut document = Document::new();
        let id = document.subtitles_mut().append().unwrap();
        let command = crate::core::commands::SetSubtitleTimesCommand::new(id, 10, 20);
        assert!(document.add_command(Box::new(command)).unwrap().is_none());
        assert_eq!(document.subtitle(id).unwrap().end_value(), 0);
    }

    #[test]
    fn undo_and_redo_replay_notifications() {
        let mut document = Document::new();
        let id = document.subtitles_mut().append().unwrap();

        document.start_command("Set time");
        document
            .subtitle_mut(id)
            .unwrap()
            .set_start_and_end(
                SubtitleTime::new(1000),
                SubtitleTime::new(3000),
            )
            .unwrap();
        document.finish_command();
        document.set_changed(false);

        let names = recorder(&mut document);
        assert!(document.undo().unwrap());
        assert_eq!(document.subtitle(id).unwrap().end().totalmsecs(), 0);
        assert!(document.is_changed());
        assert!(document.redo().unwrap());
        assert_eq!(document.subtitle(id).unwrap().end().totalmsecs(), 3000);
        assert!(!document.redo().unwrap());

        let names = names.lock().unwrap();
        assert_eq!(
            names.iter().filter(|n| **n == "subtitle-time-changed").count(),
            2
        );
        assert_eq!(names.iter().filter(|n| **n == "history-changed").count(), 2);
    }

    #[test]
    fn failed_undo_leaves_document_untouched() {
        let mut document = Document::new();
        let a = document.subtitles_mut().append().unwrap();
        let b = document.subtitles_mut().append().unwrap();

        document.start_command("Texts");
        document.subtitle_mut(a).unwrap().set_text("A").unwrap();
        document.subtitle_mut(b).unwrap().set_text("B").unwrap();
        document.finish_command();

        // Removed without recording, so the group now names a dead handle
        document.subtitles_mut().remove(&[a]).unwrap();
        document.set_changed(false);
        let names = recorder(&mut document);

        assert!(document.undo().is_err());
        assert_eq!(document.subtitle(b).unwrap().text(), "B");
        assert!(!document.is_changed());
        assert!(names.lock().unwrap().is_empty());
        assert!(document.command_system().can_undo());
    }

    #[test]
    fn timing_mode_change_converts_and_clears_history() {
        let mut document = Document::new();
        document.start_command("Add");
        let id = document.subtitles_mut().append().unwrap();
        document
            .subtitle_mut(id)
            .unwrap()
            .set_start_and_end(SubtitleTime::new(2000), SubtitleTime::new(4000))
            .unwrap();
        document.finish_command();
        assert!(document.command_system().can_undo());

        assert!(document.set_timing_mode(TimingMode::Frame));
        assert!(!document.set_timing_mode(TimingMode::Frame));
        assert!(!document.command_system().can_undo());
        assert_eq!(document.subtitle(id).unwrap().end_value(), 100);

    }

    #[test]
    fn timing_mode_change_refused_while_recording() {
        let mut document = Document::new();
        document.start_command("Open");
        assert!(!document.set_timing_mode(TimingMode::Frame));
        assert_eq!(document.timing_mode(), TimingMode::Time);
    }

    #[test]
    fn framerate_change_keeps_frames_in_frame_mode() {
        let mut document = Document::new();
        document.set_timing_mode(TimingMode::Frame);
        let id = document.subtitles_mut().append().unwrap();
        document.subtitle_mut(id).unwrap().set_end_frame(50).unwrap();

        let names = recorder(&mut document);
        document.set_framerate(FrameRate::Fps24);
        assert_eq!(document.subtitle(id).unwrap().end_value(), 50);
        assert_eq!(
            document.subtitle(id).unwrap().end().totalmsecs(),
            SubtitleTime::frame_to_time(50, 24.0).totalmsecs()
        );
        assert_eq!(*names.lock().unwrap(), vec!["framerate-changed"]);
    }

    #[test]
    fn duplicate_copies_settings_and_optionally_content() {
        let mut source = Document::new();
        source.set_name("episode");
        source.set_framerate(FrameRate::Fps30);
        source.subtitles_mut().append().unwrap();
        source.styles_mut().append("Default").unwrap();

        let empty = Document::duplicate(&source, false);
        assert_eq!(empty.name(), "episode");
        assert_eq!(empty.framerate(), FrameRate::Fps30);
        assert!(empty.subtitles().is_empty());
        assert!(empty.styles().is_empty());

        let full = Document::duplicate(&source, true);
        assert_eq!(full.subtitles().size(), 1);
        assert_eq!(full.styles().size(), 1);
        assert!(!full.command_system().can_undo());
        assert!(!full.is_changed());
    }

    #[test]
    fn removed_rows_leave_the_selection() {
        let mut document = Document::new();
        let a = document.subtitles_mut().append().unwrap();
        let b = document.subtitles_mut().append().unwrap();
        document.subtitles_mut().select(&[a, b]).unwrap();

        let names = recorder(&mut document);
        document.subtitles_mut().remove(&[a]).unwrap();
        assert!(!document.is_selected(a));
        assert!(document.is_selected(b));
        assert_eq!(
            *names.lock().unwrap(),
            vec!["subtitle-selection-changed", "subtitle-deleted"]
        );
    }

    #[test]
    fn metadata_setters_emit_property_events() {
        let mut document = Document::new();
        let names = recorder(&mut document);
        document.set_charset("UTF-8");
        document.set_newline(Newline::Windows);
        assert_eq!(document.newline(), Newline::Windows);
        assert_eq!(
            *names.lock().unwrap(),
            vec!["document-property-changed", "document-property-changed"]
        );
    }
}
