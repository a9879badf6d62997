//! Command Trait Definition
//!
//! Defines the trait that all edit commands must implement.

use serde::{Deserialize, Serialize};

use crate::core::{model::DocumentModel, CoreResult, StyleId, SubtitleId};

/// Command execution result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// List of state changes, in the order they happened
    pub changes: Vec<StateChange>,
}

impl CommandResult {
    /// Creates a new empty command result
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state change
    pub fn with_change(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Appends the changes of another result
    pub fn merge(&mut self, other: CommandResult) {
        self.changes.extend(other.changes);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// State change types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateChange {
    SubtitleTimeChanged { id: SubtitleId },
    SubtitleTextChanged { id: SubtitleId },
    /// Any other persisted field (style, actor, margins, effect, note)
    SubtitleModified { id: SubtitleId },
    SubtitlesInserted { ids: Vec<SubtitleId> },
    SubtitlesDeleted { ids: Vec<SubtitleId> },
    SubtitlesReordered,
    StylesInserted { ids: Vec<StyleId> },
    StylesDeleted { ids: Vec<StyleId> },
    StyleModified { id: StyleId },
}

/// Trait that all edit commands must implement
///
/// # Core Principles
/// - All document mutations go through Commands.
/// - A Command stores only the before/after values it needs to invert itself.
/// - `restore` is only called after `execute` succeeded, and `execute` is
///   called again on redo.
///
/// # Example
/// ```rust,ignore
/// pub struct SetLayerCommand {
///     id: SubtitleId,
///     layer: i64,
///     previous: Option<i64>,
/// }
///
/// impl Command for SetLayerCommand {
///     fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
///         // Capture the previous layer, write the new one
///     }
///
///     fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
///         // Write the captured layer back
///     }
///
///     fn type_name(&self) -> &'static str {
///         "SetLayer"
///     }
///
///     fn to_json(&self) -> serde_json::Value {
///         serde_json::json!({ "id": self.id, "layer": self.layer })
///     }
/// }
/// ```
pub trait Command: Send {
    /// Execute the command
    ///
    /// On failure, the model must remain unchanged.
    /// Uses &mut self to capture undo state during execution.
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult>;

    /// Undo the command
    ///
    /// Inverse operation of execute.
    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult>;

    /// Command type name
    ///
    /// Used for history display and debugging.
    fn type_name(&self) -> &'static str;

    /// JSON serialization, for logs and debugging
    fn to_json(&self) -> serde_json::Value;
}
