//! Per-finger affine calibration from raw curl samples to a normalized 0..1 curl,
//! and projection of that curl into a joint's actuator range.

use crate::joint::{Finger, Joint};

/// Raw curl samples captured with the finger fully open and fully closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerCalibration {
    pub open: f32,
    pub closed: f32,
}

impl Default for FingerCalibration {
    /// Identity mapping: raw curls are already 0 (open) .. 1 (closed).
    fn default() -> Self {
        Self {
            open: 0.0,
            closed: 1.0,
        }
    }
}

impl FingerCalibration {
    pub fn normalize(&self, raw: f32) -> f32 {
        normalize(raw, self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationSet {
    fingers: [FingerCalibration; 5],
}

impl CalibrationSet {
    pub fn new(fingers: [FingerCalibration; 5]) -> Self {
        Self { fingers }
    }

    #[inline]
    pub fn get(&self, finger: Finger) -> &FingerCalibration {
        &self.fingers[finger.idx()]
    }

    pub fn set(&mut self, finger: Finger, calibration: FingerCalibration) {
        self.fingers[finger.idx()] = calibration;
    }
}

#[inline]
fn clamp01(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// `(raw - open) / (closed - open)` clamped to [0, 1].
///
/// When `open == closed` the calibration carries no range and the raw value is
/// passed through (clamped). NaN inputs map to 0.
pub fn normalize(raw: f32, calibration: &FingerCalibration) -> f32 {
    let span = calibration.closed - calibration.open;
    if span == 0.0 || !span.is_finite() {
        return clamp01(raw);
    }
    clamp01((raw - calibration.open) / span)
}

/// `round(min + curl·(max - min))`, clamped to [min, max].
pub fn to_servo_angle(curl01: f32, min: u16, max: u16) -> u16 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let span = f32::from(max) - f32::from(min);
    let angle = (f32::from(min) + clamp01(curl01) * span).round();
    // `as` saturates on out-of-range floats; the clamp keeps the joint contract.
    (angle as i64).clamp(i64::from(lo), i64::from(hi)) as u16
}

/// Project a normalized curl into the joint's full range.
#[inline]
pub fn joint_angle(joint: Joint, curl01: f32) -> u16 {
    let (min, max) = joint.range();
    to_servo_angle(curl01, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CAL: FingerCalibration = FingerCalibration {
        open: 0.2,
        closed: 0.8,
    };

    #[rstest]
    #[case(0.2, 0.0)]
    #[case(0.8, 1.0)]
    #[case(0.5, 0.5)]
    #[case(-3.0, 0.0)]
    #[case(7.0, 1.0)]
    fn normalizes_through_range(#[case] raw: f32, #[case] expected: f32) {
        assert!((normalize(raw, &CAL) - expected).abs() < 1e-6);
    }

    #[test]
    fn inverted_calibration_is_supported() {
        // Sensors that read high when open still map open -> 0, closed -> 1.
        let inv = FingerCalibration {
            open: 0.9,
            closed: 0.1,
        };
        assert!((normalize(0.9, &inv) - 0.0).abs() < 1e-6);
        assert!((normalize(0.1, &inv) - 1.0).abs() < 1e-6);
        assert!((normalize(0.5, &inv) - 0.5).abs() < 1e-6);
    }

    #[rstest]
    #[case(0.4, 0.4)]
    #[case(-1.0, 0.0)]
    #[case(1.7, 1.0)]
    fn degenerate_calibration_passes_raw_through(#[case] raw: f32, #[case] expected: f32) {
        let flat = FingerCalibration {
            open: 0.5,
            closed: 0.5,
        };
        assert_eq!(normalize(raw, &flat), expected);
    }

    #[test]
    fn nan_raw_maps_to_open() {
        assert_eq!(normalize(f32::NAN, &CAL), 0.0);
    }

    #[rstest]
    #[case(0.0, 0, 180, 0)]
    #[case(1.0, 0, 180, 180)]
    #[case(0.5, 0, 150, 75)]
    #[case(0.501, 0, 180, 90)]
    #[case(2.0, 0, 150, 150)]
    #[case(-1.0, 0, 150, 0)]
    #[case(0.5, 20, 40, 30)]
    fn projects_into_servo_range(
        #[case] curl: f32,
        #[case] min: u16,
        #[case] max: u16,
        #[case] expected: u16,
    ) {
        assert_eq!(to_servo_angle(curl, min, max), expected);
    }

    #[test]
    fn joint_angle_uses_joint_range() {
        assert_eq!(joint_angle(Joint::Thumb, 1.0), 150);
        assert_eq!(joint_angle(Joint::Index, 1.0), 180);
    }
}
