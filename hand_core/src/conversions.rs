//! `From` implementations bridging `hand_config` types to `hand_core` types.

use crate::calibration::{CalibrationSet, FingerCalibration};
use crate::config::{DispatcherCfg, PlaybackCfg, SmoothingCfg};
use crate::joint::{Finger, TargetPositions};
use crate::program::{CommandKind, Program};
use crate::util::interval_ms;
use std::time::Duration;

// ── DispatcherCfg ────────────────────────────────────────────────────────────

impl From<&hand_config::DispatcherCfg> for DispatcherCfg {
    fn from(c: &hand_config::DispatcherCfg) -> Self {
        Self {
            command_interval: interval_ms(c.command_interval_ms),
        }
    }
}

// ── PlaybackCfg ──────────────────────────────────────────────────────────────

impl From<&hand_config::PlaybackCfg> for PlaybackCfg {
    fn from(c: &hand_config::PlaybackCfg) -> Self {
        Self {
            settle_delay: Duration::from_millis(c.settle_delay_ms),
        }
    }
}

// ── SmoothingCfg ─────────────────────────────────────────────────────────────

impl From<&hand_config::SmoothingCfg> for SmoothingCfg {
    fn from(c: &hand_config::SmoothingCfg) -> Self {
        Self { alpha: c.alpha }
    }
}

// ── Calibration ──────────────────────────────────────────────────────────────

impl From<&hand_config::CalibrationTable> for CalibrationSet {
    fn from(t: &hand_config::CalibrationTable) -> Self {
        CalibrationSet::new(t.fingers.map(|(open, closed)| FingerCalibration { open, closed }))
    }
}

impl From<&CalibrationSet> for hand_config::CalibrationTable {
    fn from(s: &CalibrationSet) -> Self {
        Self {
            fingers: Finger::ALL.map(|f| {
                let c = s.get(f);
                (c.open, c.closed)
            }),
        }
    }
}

// ── Program ──────────────────────────────────────────────────────────────────

impl From<&hand_config::CommandEntry> for CommandKind {
    fn from(e: &hand_config::CommandEntry) -> Self {
        match *e {
            hand_config::CommandEntry::Move {
                thumb,
                index,
                middle,
                ring,
                pinky,
                wrist,
            } => CommandKind::Move(TargetPositions::new(thumb, index, middle, ring, pinky, wrist)),
            hand_config::CommandEntry::Wait { seconds } => CommandKind::wait_secs(seconds),
        }
    }
}

impl From<&hand_config::ProgramFile> for Program {
    fn from(f: &hand_config::ProgramFile) -> Self {
        let mut program = Program::new(f.name.clone());
        for entry in &f.commands {
            program.add_command(entry.into());
        }
        program
    }
}
