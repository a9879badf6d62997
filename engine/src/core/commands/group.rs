//! Command Group
//!
//! An ordered list of commands recorded between `start` and `finish`,
//! replayed and unwound as a single undo unit.

use tracing::warn;

use crate::core::{
    commands::{Command, CommandResult},
    model::DocumentModel,
    CoreResult,
};

pub struct CommandGroup {
    description: String,
    commands: Vec<Box<dyn Command>>,
}

impl std::fmt::Debug for CommandGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGroup")
            .field("description", &self.description)
            .field(
                "commands",
                &self.commands.iter().map(|c| c.type_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl CommandGroup {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            commands: Vec::new(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Appends an already executed command
    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }
}

/// Replays every command or none: when one fails, the commands already
/// replayed are unwound before the error is returned.
impl Command for CommandGroup {
    fn execute(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let mut result = CommandResult::new();
        for index in 0..self.commands.len() {
            match self.commands[index].execute(model) {
                Ok(changes) => result.merge(changes),
                Err(e) => {
                    for command in self.commands[..index].iter_mut().rev() {
                        if let Err(rollback) = command.restore(model) {
                            warn!(command = command.type_name(), error = %rollback, "Rollback failed");
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(result)
    }

    fn restore(&mut self, model: &mut DocumentModel) -> CoreResult<CommandResult> {
        let mut result = CommandResult::new();
        for index in (0..self.commands.len()).rev() {
            match self.commands[index].restore(model) {
                Ok(changes) => result.merge(changes),
                Err(e) => {
                    for command in self.commands[index + 1..].iter_mut() {
                        if let Err(rollback) = command.execute(model) {
                            warn!(command = command.type_name(), error = %rollback, "Rollback failed");
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(result)
    }

    fn type_name(&self) -> &'static str {
        "CommandGroup"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "description": self.description,
            "commands": self.commands.iter().map(|c| c.to_json()).collect::<Vec<_>>(),
        })
    }
}
