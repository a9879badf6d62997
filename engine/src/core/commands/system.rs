//! Command System Module
//!
//! Per-document undo/redo history. Commands are recorded into a group
//! opened by `start` and committed by `finish`; each committed group is one
//! undo unit.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::core::{
    commands::{Command, CommandGroup, CommandResult},
    model::DocumentModel,
    CoreResult, OpId,
};

/// Default maximum number of undo units kept
pub const DEFAULT_MAX_UNDO_DEPTH: usize = 100;

// =============================================================================
// History Entry
// =============================================================================

/// Entry in the undo/redo history
#[derive(Debug)]
pub struct HistoryEntry {
    /// Operation ID
    pub op_id: OpId,
    /// Timestamp of the last commit, undo or redo of this entry
    pub timestamp: String,
    group: CommandGroup,
}

impl HistoryEntry {
    fn new(group: CommandGroup) -> Self {
        Self {
            op_id: ulid::Ulid::new().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            group,
        }
    }

    pub fn description(&self) -> &str {
        self.group.description()
    }

    pub fn command_count(&self) -> usize {
        self.group.len()
    }

    fn touch(&mut self) {
        self.timestamp = chrono::Utc::now().to_rfc3339();
    }
}

// =============================================================================
// Command System
// =============================================================================

/// Records command groups and manages undo/redo history
pub struct CommandSystem {
    /// Undo stack
    undo_stack: VecDeque<HistoryEntry>,
    /// Redo stack
    redo_stack: VecDeque<HistoryEntry>,
    /// Group being recorded, if any
    current: Option<CommandGroup>,
    /// Maximum history size
    max_undo_depth: usize,
}

impl CommandSystem {
    /// Creates an idle command system with empty history
    pub fn new() -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            current: None,
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
        }
    }

    /// Sets the maximum history size
    pub fn with_max_undo_depth(mut self, depth: usize) -> Self {
        self.set_max_undo_depth(depth);
        self
    }

    /// Sets the maximum history size, evicting the oldest entries if needed
    pub fn set_max_undo_depth(&mut self, depth: usize) {
        self.max_undo_depth = depth;
        self.trim();
    }

    pub fn max_undo_depth(&self) -> usize {
        self.max_undo_depth
    }

    /// Returns true while a group is open
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    /// Opens a new group. Ignored (returns false) when one is already open.
    pub fn start(&mut self, description: impl Into<String>) -> bool {
        let description = description.into();
        if let Some(open) = &self.current {
            warn!(
                open = open.description(),
                ignored = %description,
                "Command group already open, start ignored"
            );
            return false;
        }
        debug!(description = %description, "Command group started");
        self.current = Some(CommandGroup::new(description));
        true
    }

    /// Executes a command and appends it to the open group.
    ///
    /// Returns `Ok(None)` without executing anything when no group is open.
    /// A command whose execution fails is not recorded.
    pub fn add(
        &mut self,
        mut command: Box<dyn Command>,
        model: &mut DocumentModel,
    ) -> CoreResult<Option<CommandResult>> {
        let Some(group) = self.current.as_mut() else {
            warn!(
                command = command.type_name(),
                "No command group open, command discarded"
            );
            return Ok(None);
        };

        let result = command.execute(model)?;
        group.push(command);
        Ok(Some(result))
    }

    /// Closes the open group.
    ///
    /// A non-empty group is pushed onto the undo stack, evicting the oldest
    /// entry beyond the maximum depth, and the redo stack is cleared. An
    /// empty group is discarded. Returns the new entry's op id.
    pub fn finish(&mut self) -> Option<OpId> {
        let Some(group) = self.current.take() else {
            warn!("No command group open, finish ignored");
            return None;
        };

        if group.is_empty() {
            debug!(description = group.description(), "Empty command group discarded");
            return None;
        }

        let entry = HistoryEntry::new(group);
        let op_id = entry.op_id.clone();
        debug!(
            op_id = %op_id,
            description = entry.description(),
            commands = entry.command_count(),
            "Command group committed"
        );

        self.redo_stack.clear();
        self.undo_stack.push_back(entry);
        self.trim();

        Some(op_id)
    }

    /// Restores the most recent group and moves it onto the redo stack.
    /// On failure the model is left as it was and the group stays on the
    /// undo stack.
    ///
    /// Returns `Ok(None)` when recording or when there is nothing to undo.
    pub fn undo(&mut self, model: &mut DocumentModel) -> CoreResult<Option<CommandResult>> {
        if self.is_recording() {
            warn!("Undo ignored while a command group is open");
            return Ok(None);
        }
        let Some(mut entry) = self.undo_stack.pop_back() else {
            debug!("Nothing to undo");
            return Ok(None);
        };

        let result = match entry.group.restore(model) {
            Ok(result) => result,
            Err(e) => {
                warn!(op_id = %entry.op_id, error = %e, "Undo failed, history kept");
                self.undo_stack.push_back(entry);
                return Err(e);
            }
        };
        debug!(op_id = %entry.op_id, description = entry.description(), "Undo");

        entry.touch();
        self.redo_stack.push_back(entry);
        Ok(Some(result))
    }

    /// Re-executes the most recently undone group.
    ///
    /// Returns `Ok(None)` when recording or when there is nothing to redo.
    pub fn redo(&mut self, model: &mut DocumentModel) -> CoreResult<Option<CommandResult>> {
        if self.is_recording() {
            warn!("Redo ignored while a command group is open");
            return Ok(None);
        }
        let Some(mut entry) = self.redo_stack.pop_back() else {
            debug!("Nothing to redo");
            return Ok(None);
        };

        let result = match entry.group.execute(model) {
            Ok(result) => result,
            Err(e) => {
                warn!(op_id = %entry.op_id, error = %e, "Redo failed, history kept");
                self.redo_stack.push_back(entry);
                return Err(e);
            }
        };
        debug!(op_id = %entry.op_id, description = entry.description(), "Redo");

        entry.touch();
        self.undo_stack.push_back(entry);
        Ok(Some(result))
    }

    /// Returns true if undo is available
    pub fn can_undo(&self) -> bool {
        !self.is_recording() && !self.undo_stack.is_empty()
    }

    /// Returns true if redo is available
    pub fn can_redo(&self) -> bool {
        !self.is_recording() && !self.redo_stack.is_empty()
    }

    /// Returns the number of groups in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of groups in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Description of the group `undo` would restore
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(HistoryEntry::description)
    }

    /// Description of the group `redo` would re-execute
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(HistoryEntry::description)
    }

    /// Undo history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.undo_stack.iter()
    }

    /// Clears all history (undo and redo). An open group is kept.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_undo_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                debug!(op_id = %evicted.op_id, "Evicted oldest history entry");
            }
        }
    }
}

impl Default for CommandSystem {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
