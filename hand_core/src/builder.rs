//! Builder assembling a `Controller` from its parts or from a loaded `Config`.

use hand_traits::{Clock, MonotonicClock, Transport};

use crate::calibration::CalibrationSet;
use crate::config::{DispatcherCfg, PlaybackCfg, SmoothingCfg};
use crate::controller::Controller;
use crate::dispatcher::Dispatcher;
use crate::editor::ProgramEditor;
use crate::error::{BuildError, Report, Result};
use crate::pose::PoseNormalizer;
use crate::program::Program;

/// Builder for `Controller`. Only the transport is mandatory.
pub struct ControllerBuilder<T: Transport, C: Clock> {
    transport: Option<T>,
    clock: C,
    dispatcher: DispatcherCfg,
    playback: PlaybackCfg,
    smoothing: SmoothingCfg,
    calibration: CalibrationSet,
    program: Option<Program>,
}

impl<T: Transport> Default for ControllerBuilder<T, MonotonicClock> {
    fn default() -> Self {
        Self {
            transport: None,
            clock: MonotonicClock::new(),
            dispatcher: DispatcherCfg::default(),
            playback: PlaybackCfg::default(),
            smoothing: SmoothingCfg::default(),
            calibration: CalibrationSet::default(),
            program: None,
        }
    }
}

impl<T: Transport> ControllerBuilder<T, MonotonicClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport, C: Clock> ControllerBuilder<T, C> {
    pub fn with_transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a different time source (tests use a manual clock).
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ControllerBuilder<T, C2> {
        ControllerBuilder {
            transport: self.transport,
            clock,
            dispatcher: self.dispatcher,
            playback: self.playback,
            smoothing: self.smoothing,
            calibration: self.calibration,
            program: self.program,
        }
    }

    pub fn dispatcher(mut self, cfg: DispatcherCfg) -> Self {
        self.dispatcher = cfg;
        self
    }

    pub fn playback(mut self, cfg: PlaybackCfg) -> Self {
        self.playback = cfg;
        self
    }

    pub fn smoothing(mut self, cfg: SmoothingCfg) -> Self {
        self.smoothing = cfg;
        self
    }

    pub fn calibration(mut self, calibration: CalibrationSet) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn program(mut self, program: Program) -> Self {
        self.program = Some(program);
        self
    }

    /// Apply the dispatcher, playback and smoothing sections of a config.
    pub fn apply_config(self, cfg: &hand_config::Config) -> Self {
        self.dispatcher((&cfg.dispatcher).into())
            .playback((&cfg.playback).into())
            .smoothing((&cfg.smoothing).into())
    }

    pub fn build(self) -> Result<Controller<T, C>> {
        let transport = self
            .transport
            .ok_or_else(|| Report::new(BuildError::MissingTransport))?;
        let alpha = self.smoothing.alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Report::new(BuildError::InvalidConfig(
                "smoothing alpha must be in (0.0, 1.0]",
            )));
        }
        if self.dispatcher.command_interval.is_zero() {
            return Err(Report::new(BuildError::InvalidConfig(
                "command interval must be > 0",
            )));
        }
        let program = self.program.unwrap_or_else(|| Program::new("untitled"));
        Ok(Controller::new(
            Dispatcher::new(transport, self.dispatcher),
            ProgramEditor::new(program, self.playback),
            PoseNormalizer::new(self.calibration, alpha),
            self.clock,
        ))
    }
}
