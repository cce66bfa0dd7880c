//! Guided calibration capture.
//!
//! Linear sequence: all fingers open, all fingers closed, then each finger
//! opened on its own while the others stay closed. Every capture stores one
//! scalar per affected finger. The only way back is `reset`.

use crate::calibration::{CalibrationSet, FingerCalibration};
use crate::joint::Finger;
use crate::pose::RawCurls;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    AllOpen,
    AllClosed,
    FingerOpen(Finger),
    Done,
}

impl CalibrationStep {
    const SEQUENCE: [CalibrationStep; 8] = [
        CalibrationStep::AllOpen,
        CalibrationStep::AllClosed,
        CalibrationStep::FingerOpen(Finger::Thumb),
        CalibrationStep::FingerOpen(Finger::Index),
        CalibrationStep::FingerOpen(Finger::Middle),
        CalibrationStep::FingerOpen(Finger::Ring),
        CalibrationStep::FingerOpen(Finger::Pinky),
        CalibrationStep::Done,
    ];

    /// Operator prompt for this step.
    pub fn instruction(&self) -> String {
        match self {
            CalibrationStep::AllOpen => "Open your hand fully and hold still".to_string(),
            CalibrationStep::AllClosed => "Make a tight fist and hold still".to_string(),
            CalibrationStep::FingerOpen(f) => {
                format!("Keep a fist and extend only your {f}")
            }
            CalibrationStep::Done => "Calibration complete".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CalibrationWizard {
    step: usize,
    open: [Option<f32>; 5],
    closed: [Option<f32>; 5],
}

impl CalibrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> CalibrationStep {
        CalibrationStep::SEQUENCE[self.step.min(CalibrationStep::SEQUENCE.len() - 1)]
    }

    /// Zero-based position in the capture sequence.
    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        CalibrationStep::SEQUENCE.len() - 1
    }

    pub fn is_complete(&self) -> bool {
        self.current_step() == CalibrationStep::Done
    }

    pub fn instruction(&self) -> String {
        self.current_step().instruction()
    }

    /// Record the current frame for the active step and advance.
    /// Returns the step that was captured, or `None` once complete.
    pub fn capture(&mut self, raw: RawCurls) -> Option<CalibrationStep> {
        let step = self.current_step();
        match step {
            CalibrationStep::AllOpen => {
                for f in Finger::ALL {
                    self.open[f.idx()] = Some(raw[f.idx()]);
                }
            }
            CalibrationStep::AllClosed => {
                for f in Finger::ALL {
                    self.closed[f.idx()] = Some(raw[f.idx()]);
                }
            }
            CalibrationStep::FingerOpen(f) => {
                self.open[f.idx()] = Some(raw[f.idx()]);
            }
            CalibrationStep::Done => return None,
        }
        self.step += 1;
        tracing::debug!(step = ?step, next = ?self.current_step(), "calibration step captured");
        Some(step)
    }

    /// Discard everything and start over at the first step.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Finished calibration, available once every step has been captured.
    pub fn calibration(&self) -> Option<CalibrationSet> {
        if !self.is_complete() {
            return None;
        }
        let mut set = CalibrationSet::default();
        for f in Finger::ALL {
            set.set(
                f,
                FingerCalibration {
                    open: self.open[f.idx()]?,
                    closed: self.closed[f.idx()]?,
                },
            );
        }
        Some(set)
    }
}
