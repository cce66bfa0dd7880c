//! Stored motion programs.
//!
//! A program exclusively owns an ordered list of commands. Every command carries
//! an order index that always equals its position (dense, zero-based); any
//! structural change re-densifies. Every mutation bumps `modified_at`.

use std::fmt;
use std::time::{Duration, SystemTime};

use crate::error::HandError;
use crate::joint::TargetPositions;
use crate::util::secs_to_duration;

/// Stable identity of a command within its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(u64);

impl CommandId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandKind {
    /// Drive every joint to the given targets.
    Move(TargetPositions),
    /// Hold the current pose for a duration.
    Wait(Duration),
}

impl CommandKind {
    /// Wait from a seconds value; negative or NaN becomes zero.
    pub fn wait_secs(secs: f64) -> Self {
        CommandKind::Wait(secs_to_duration(secs))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramCommand {
    id: CommandId,
    order: usize,
    kind: CommandKind,
}

impl ProgramCommand {
    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    name: String,
    commands: Vec<ProgramCommand>,
    next_id: u64,
    modified_at: SystemTime,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
            next_id: 0,
            modified_at: SystemTime::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn modified_at(&self) -> SystemTime {
        self.modified_at
    }

    /// Restore a timestamp from storage without counting as a mutation.
    pub fn set_modified_at(&mut self, at: SystemTime) {
        self.modified_at = at;
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[ProgramCommand] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramCommand> {
        self.commands.iter()
    }

    /// Command at order index `index`.
    pub fn get(&self, index: usize) -> Option<&ProgramCommand> {
        self.commands.get(index)
    }

    pub fn command(&self, id: CommandId) -> Option<&ProgramCommand> {
        self.commands.iter().find(|c| c.id == id)
    }

    fn position(&self, id: CommandId) -> Result<usize, HandError> {
        self.commands
            .iter()
            .position(|c| c.id == id)
            .ok_or(HandError::UnknownCommand(id))
    }

    /// Append; the new command's order index is the previous length.
    pub fn add_command(&mut self, kind: CommandKind) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id += 1;
        self.commands.push(ProgramCommand {
            id,
            order: self.commands.len(),
            kind,
        });
        self.touch();
        id
    }

    /// Remove by identity and re-densify the remaining order indices.
    pub fn remove_command(&mut self, id: CommandId) -> Result<ProgramCommand, HandError> {
        let pos = self.position(id)?;
        let removed = self.commands.remove(pos);
        self.redensify();
        self.touch();
        Ok(removed)
    }

    /// Replace a command's payload. Its order index is unchanged.
    pub fn update_command(&mut self, id: CommandId, kind: CommandKind) -> Result<(), HandError> {
        let pos = self.position(id)?;
        self.commands[pos].kind = kind;
        self.touch();
        Ok(())
    }

    /// Move a command to order index `to` (clamped to the last slot).
    pub fn move_command(&mut self, id: CommandId, to: usize) -> Result<(), HandError> {
        let from = self.position(id)?;
        let cmd = self.commands.remove(from);
        let to = to.min(self.commands.len());
        self.commands.insert(to, cmd);
        self.redensify();
        self.touch();
        Ok(())
    }

    /// Drop every command.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.touch();
    }

    fn redensify(&mut self) {
        for (i, c) in self.commands.iter_mut().enumerate() {
            c.order = i;
        }
    }

    fn touch(&mut self) {
        self.modified_at = SystemTime::now();
    }
}
