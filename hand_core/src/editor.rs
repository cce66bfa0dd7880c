//! Program editing context with at most one playback session.
//!
//! Edits are rejected while the program is playing (`HandError::PlaybackActive`);
//! stop playback first. This keeps the running session and the program the
//! operator sees identical.

use std::time::Instant;

use crate::config::PlaybackCfg;
use crate::dispatcher::MoveSink;
use crate::error::{HandError, Report, Result};
use crate::program::{CommandId, CommandKind, Program, ProgramCommand};
use crate::playback::{PlaybackEngine, PlaybackState, StepEvent, TraversalMode};

#[derive(Debug)]
pub struct ProgramEditor {
    program: Program,
    engine: PlaybackEngine,
}

impl ProgramEditor {
    pub fn new(program: Program, cfg: PlaybackCfg) -> Self {
        Self {
            program,
            engine: PlaybackEngine::new(cfg),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn state(&self) -> PlaybackState {
        self.engine.state()
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_running()
    }

    fn guard(&self) -> Result<()> {
        if self.engine.is_running() {
            tracing::debug!(program = self.program.name(), "edit rejected during playback");
            return Err(Report::new(HandError::PlaybackActive));
        }
        Ok(())
    }

    pub fn add_command(&mut self, kind: CommandKind) -> Result<CommandId> {
        self.guard()?;
        Ok(self.program.add_command(kind))
    }

    pub fn remove_command(&mut self, id: CommandId) -> Result<ProgramCommand> {
        self.guard()?;
        self.program.remove_command(id).map_err(Report::new)
    }

    pub fn update_command(&mut self, id: CommandId, kind: CommandKind) -> Result<()> {
        self.guard()?;
        self.program.update_command(id, kind).map_err(Report::new)
    }

    pub fn move_command(&mut self, id: CommandId, to: usize) -> Result<()> {
        self.guard()?;
        self.program.move_command(id, to).map_err(Report::new)
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        self.guard()?;
        self.program.rename(name);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.guard()?;
        self.program.clear();
        Ok(())
    }

    /// Swap in a different program (e.g. loaded from storage).
    pub fn load(&mut self, program: Program) -> Result<()> {
        self.guard()?;
        self.program = program;
        Ok(())
    }

    pub fn play(
        &mut self,
        mode: TraversalMode,
        now: Instant,
        sink: &mut dyn MoveSink,
    ) -> Option<StepEvent> {
        self.engine.start(&self.program, mode, now, sink)
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn poll(&mut self, now: Instant, sink: &mut dyn MoveSink) -> Option<StepEvent> {
        self.engine.poll(now, sink)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.next_deadline()
    }
}
