//! Live pose → finger targets.
//!
//! Each frame carries one raw curl per finger (0.0 open .. 1.0 closed, computed
//! upstream from joint geometry). Fingers are processed independently:
//! calibrate, smooth, then project into the finger's actuator range.

use crate::calibration::{CalibrationSet, joint_angle};
use crate::joint::{Finger, FingerAngles};
use crate::smoothing::{DEFAULT_ALPHA, SmoothingState, smooth};

/// Raw per-finger curls of one detected hand, in `Finger::ALL` order.
pub type RawCurls = [f32; 5];

/// One camera frame: `None` when the hand was not detected.
pub type PoseFrame = Option<RawCurls>;

#[derive(Debug, Clone)]
pub struct PoseNormalizer {
    calibration: CalibrationSet,
    smoothing: [SmoothingState; 5],
    alpha: f32,
}

impl Default for PoseNormalizer {
    fn default() -> Self {
        Self::new(CalibrationSet::default(), DEFAULT_ALPHA)
    }
}

impl PoseNormalizer {
    pub fn new(calibration: CalibrationSet, alpha: f32) -> Self {
        Self {
            calibration,
            smoothing: [SmoothingState::default(); 5],
            alpha,
        }
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    /// Swap in a fresh calibration. Smoothing history is kept.
    pub fn set_calibration(&mut self, calibration: CalibrationSet) {
        self.calibration = calibration;
    }

    pub fn is_initialized(&self, finger: Finger) -> bool {
        self.smoothing[finger.idx()].is_initialized()
    }

    pub fn process(&mut self, raw: RawCurls) -> FingerAngles {
        let mut angles = [0i64; 5];
        for finger in Finger::ALL {
            let i = finger.idx();
            let curl01 = self.calibration.get(finger).normalize(raw[i]);
            let (smoothed, state) = smooth(curl01, self.smoothing[i], self.alpha);
            self.smoothing[i] = state;
            angles[i] = i64::from(joint_angle(finger.joint(), smoothed));
        }
        FingerAngles::new(angles)
    }

    /// Hand left the frame: drop all history so a stale pose cannot linger.
    pub fn tracking_lost(&mut self) {
        for s in &mut self.smoothing {
            s.reset();
        }
    }

    /// Process a frame that may be a tracking loss. Returns angles only for detections.
    pub fn handle_frame(&mut self, frame: PoseFrame) -> Option<FingerAngles> {
        match frame {
            Some(raw) => Some(self.process(raw)),
            None => {
                if self.smoothing.iter().any(|s| s.is_initialized()) {
                    tracing::debug!("hand tracking lost; smoothing reset");
                }
                self.tracking_lost();
                None
            }
        }
    }
}
