//! Document Event Module
//!
//! Typed change notifications raised by a document and the listener
//! registry that delivers them.

use serde::{Deserialize, Serialize};

use crate::core::{
    commands::StateChange, time::FrameRate, StyleId, SubscriptionId, SubtitleId, TimingMode,
};

// =============================================================================
// Event Names
// =============================================================================

/// Stable event names, for listeners keyed by string
pub mod event_names {
    /// A command group was committed, undone or redone
    pub const DOCUMENT_CHANGED: &str = "document-changed";
    /// Filename, name, format, charset or newline changed
    pub const DOCUMENT_PROPERTY_CHANGED: &str = "document-property-changed";
    pub const SUBTITLE_TIME_CHANGED: &str = "subtitle-time-changed";
    pub const SUBTITLE_TEXT_CHANGED: &str = "subtitle-text-changed";
    /// Any other subtitle field
    pub const SUBTITLE_CHANGED: &str = "subtitle-changed";
    pub const SUBTITLE_SELECTION_CHANGED: &str = "subtitle-selection-changed";
    pub const TIMING_MODE_CHANGED: &str = "timing-mode-changed";
    pub const EDIT_TIMING_MODE_CHANGED: &str = "edit-timing-mode-changed";
    pub const FRAMERATE_CHANGED: &str = "framerate-changed";
    pub const SUBTITLE_DELETED: &str = "subtitle-deleted";
    pub const SUBTITLE_INSERTED: &str = "subtitle-inserted";
    pub const SUBTITLES_REORDERED: &str = "subtitles-reordered";
    pub const STYLE_CHANGED: &str = "style-changed";
    pub const STYLE_INSERTED: &str = "style-inserted";
    pub const STYLE_DELETED: &str = "style-deleted";
    /// Undo/redo availability changed
    pub const HISTORY_CHANGED: &str = "history-changed";
}

// =============================================================================
// Events
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentEvent {
    DocumentChanged,
    DocumentPropertyChanged { property: String },
    SubtitleTimeChanged { id: SubtitleId },
    SubtitleTextChanged { id: SubtitleId },
    SubtitleChanged { id: SubtitleId },
    SubtitleSelectionChanged,
    TimingModeChanged { mode: TimingMode },
    EditTimingModeChanged { mode: TimingMode },
    FramerateChanged { framerate: FrameRate },
    /// One event per batch, never one per row
    SubtitlesDeleted { ids: Vec<SubtitleId> },
    SubtitlesInserted { ids: Vec<SubtitleId> },
    SubtitlesReordered,
    StyleChanged { id: StyleId },
    StyleInserted { ids: Vec<StyleId> },
    StyleDeleted { ids: Vec<StyleId> },
    HistoryChanged,
}

impl DocumentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentEvent::DocumentChanged => event_names::DOCUMENT_CHANGED,
            DocumentEvent::DocumentPropertyChanged { .. } => event_names::DOCUMENT_PROPERTY_CHANGED,
            DocumentEvent::SubtitleTimeChanged { .. } => event_names::SUBTITLE_TIME_CHANGED,
            DocumentEvent::SubtitleTextChanged { .. } => event_names::SUBTITLE_TEXT_CHANGED,
            DocumentEvent::SubtitleChanged { .. } => event_names::SUBTITLE_CHANGED,
            DocumentEvent::SubtitleSelectionChanged => event_names::SUBTITLE_SELECTION_CHANGED,
            DocumentEvent::TimingModeChanged { .. } => event_names::TIMING_MODE_CHANGED,
            DocumentEvent::EditTimingModeChanged { .. } => event_names::EDIT_TIMING_MODE_CHANGED,
            DocumentEvent::FramerateChanged { .. } => event_names::FRAMERATE_CHANGED,
            DocumentEvent::SubtitlesDeleted { .. } => event_names::SUBTITLE_DELETED,
            DocumentEvent::SubtitlesInserted { .. } => event_names::SUBTITLE_INSERTED,
            DocumentEvent::SubtitlesReordered => event_names::SUBTITLES_REORDERED,
            DocumentEvent::StyleChanged { .. } => event_names::STYLE_CHANGED,
            DocumentEvent::StyleInserted { .. } => event_names::STYLE_INSERTED,
            DocumentEvent::StyleDeleted { .. } => event_names::STYLE_DELETED,
            DocumentEvent::HistoryChanged => event_names::HISTORY_CHANGED,
        }
    }
}

impl From<StateChange> for DocumentEvent {
    fn from(change: StateChange) -> Self {
        match change {
            StateChange::SubtitleTimeChanged { id } => DocumentEvent::SubtitleTimeChanged { id },
            StateChange::SubtitleTextChanged { id } => DocumentEvent::SubtitleTextChanged { id },
            StateChange::SubtitleModified { id } => DocumentEvent::SubtitleChanged { id },
            StateChange::SubtitlesInserted { ids } => DocumentEvent::SubtitlesInserted { ids },
            StateChange::SubtitlesDeleted { ids } => DocumentEvent::SubtitlesDeleted { ids },
            StateChange::SubtitlesReordered => DocumentEvent::SubtitlesReordered,
            StateChange::StylesInserted { ids } => DocumentEvent::StyleInserted { ids },
            StateChange::StylesDeleted { ids } => DocumentEvent::StyleDeleted { ids },
            StateChange::StyleModified { id } => DocumentEvent::StyleChanged { id },
        }
    }
}

// =============================================================================
// Event Bus
// =============================================================================

type Listener = Box<dyn FnMut(&DocumentEvent) + Send>;

/// Fire-and-forget listener registry
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: SubscriptionId,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&DocumentEvent) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &DocumentEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
