//! Program playback state machine.
//!
//! Walks a program's commands one step at a time. A Move step hands its targets
//! to the `MoveSink` and then waits a fixed settle delay; a Wait step only waits.
//! What happens past either end depends on the traversal mode:
//!
//! - Once: stop.
//! - Loop: jump back to step 0.
//! - Bounce: flip direction and re-run the boundary step, so `[A, B, C]` runs
//!   `0,1,2,2,1,0,0,1,2,...`.
//!
//! Exactly one step timer exists per engine. Starting, stopping and every
//! scheduled step replace it.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::config::PlaybackCfg;
use crate::dispatcher::MoveSink;
use crate::program::{CommandKind, Program};
use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    #[default]
    Once,
    Loop,
    Bounce,
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraversalMode::Once => "once",
            TraversalMode::Loop => "loop",
            TraversalMode::Bounce => "bounce",
        })
    }
}

impl FromStr for TraversalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(TraversalMode::Once),
            "loop" => Ok(TraversalMode::Loop),
            "bounce" => Ok(TraversalMode::Bounce),
            other => Err(format!("unknown traversal mode {other:?} (expected once|loop|bounce)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Running { index: usize, direction: Direction },
}

/// What a single call into the engine did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEvent {
    Executed { index: usize, command: CommandKind },
    /// A Once run walked off the end and the engine went idle.
    Finished,
}

/// Ephemeral state of one run. Commands are captured at `start`.
#[derive(Debug, Clone)]
struct PlaybackSession {
    commands: Vec<CommandKind>,
    mode: TraversalMode,
    direction: Direction,
    current: usize,
}

#[derive(Debug, Default)]
pub struct PlaybackEngine {
    cfg: PlaybackCfg,
    session: Option<PlaybackSession>,
    // Payload: index of the step whose delay is running.
    timer: Timer<usize>,
    steps_executed: u64,
}

impl PlaybackEngine {
    pub fn new(cfg: PlaybackCfg) -> Self {
        Self {
            cfg,
            session: None,
            timer: Timer::new(),
            steps_executed: 0,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.cfg.settle_delay
    }

    pub fn state(&self) -> PlaybackState {
        match &self.session {
            Some(s) => PlaybackState::Running {
                index: s.current,
                direction: s.direction,
            },
            None => PlaybackState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Step being executed, for highlighting.
    pub fn current_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.current)
    }

    pub fn mode(&self) -> Option<TraversalMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.session.as_ref().map(|s| s.direction)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Total steps executed since this engine was created.
    pub fn steps_executed(&self) -> u64 {
        self.steps_executed
    }

    /// Begin playing `program` from step 0, replacing any run in progress.
    ///
    /// An empty program is a no-op and returns `None`; otherwise step 0 runs
    /// immediately and its event is returned.
    pub fn start(
        &mut self,
        program: &Program,
        mode: TraversalMode,
        now: Instant,
        sink: &mut dyn MoveSink,
    ) -> Option<StepEvent> {
        self.timer.cancel();
        self.session = None;
        if program.is_empty() {
            tracing::debug!(program = program.name(), "playback start ignored: empty program");
            return None;
        }
        self.session = Some(PlaybackSession {
            commands: program.iter().map(|c| *c.kind()).collect(),
            mode,
            direction: Direction::Forward,
            current: 0,
        });
        tracing::info!(
            program = program.name(),
            steps = program.len(),
            %mode,
            "playback started"
        );
        Some(self.execute_step(Some(0), now, sink))
    }

    /// Cancel the pending step and go idle. Safe to call in any state.
    pub fn stop(&mut self) {
        self.timer.cancel();
        if let Some(s) = self.session.take() {
            tracing::info!(at_step = s.current, "playback stopped");
        }
    }

    /// Run the next step if its delay has elapsed. At most one step per call.
    pub fn poll(&mut self, now: Instant, sink: &mut dyn MoveSink) -> Option<StepEvent> {
        let from = self.timer.take_due(now)?;
        if self.session.is_none() {
            return None;
        }
        Some(self.advance(from, now, sink))
    }

    fn advance(&mut self, from: usize, now: Instant, sink: &mut dyn MoveSink) -> StepEvent {
        let direction = self.direction().unwrap_or_default();
        let next = match direction {
            Direction::Forward => from.checked_add(1),
            Direction::Backward => from.checked_sub(1),
        };
        self.execute_step(next, now, sink)
    }

    fn execute_step(
        &mut self,
        index: Option<usize>,
        now: Instant,
        sink: &mut dyn MoveSink,
    ) -> StepEvent {
        let Some(len) = self.session.as_ref().map(|s| s.commands.len()) else {
            return StepEvent::Finished;
        };
        let Some(i) = index.filter(|i| *i < len) else {
            return self.handle_end(now, sink);
        };
        let Some(session) = self.session.as_mut() else {
            return StepEvent::Finished;
        };
        session.current = i;
        let command = session.commands[i];
        self.steps_executed += 1;
        match command {
            CommandKind::Move(targets) => {
                sink.send_positions(&targets, now);
                self.timer.schedule_after(now, self.cfg.settle_delay, i);
            }
            CommandKind::Wait(d) => {
                self.timer.schedule_after(now, d, i);
            }
        }
        tracing::debug!(index = i, ?command, "playback step");
        StepEvent::Executed { index: i, command }
    }

    fn handle_end(&mut self, now: Instant, sink: &mut dyn MoveSink) -> StepEvent {
        let Some(session) = self.session.as_mut() else {
            return StepEvent::Finished;
        };
        let mode = session.mode;
        match mode {
            TraversalMode::Once => {
                self.timer.cancel();
                self.session = None;
                tracing::info!("playback finished");
                StepEvent::Finished
            }
            TraversalMode::Loop => {
                session.direction = Direction::Forward;
                self.execute_step(Some(0), now, sink)
            }
            TraversalMode::Bounce => {
                session.direction = session.direction.flipped();
                let next = match session.direction {
                    Direction::Forward => 0,
                    Direction::Backward => session.commands.len() - 1,
                };
                self.execute_step(Some(next), now, sink)
            }
        }
    }
}
