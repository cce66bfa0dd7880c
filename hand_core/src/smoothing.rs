//! Exponential smoothing of normalized curls across pose frames.

/// Default EMA factor; closer to 1.0 = more responsive, less smoothing.
pub const DEFAULT_ALPHA: f32 = 0.35;

/// Last emitted smoothed curl of one finger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothingState {
    curl: f32,
    initialized: bool,
}

impl SmoothingState {
    #[inline]
    pub fn curl(&self) -> f32 {
        self.curl
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Forget history; the next sample is taken as-is.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Blend `raw01` into `state`.
///
/// The first sample after a reset is emitted unchanged so a re-detected hand does
/// not ramp in slowly; later samples use `alpha·raw + (1-alpha)·previous`.
pub fn smooth(raw01: f32, state: SmoothingState, alpha: f32) -> (f32, SmoothingState) {
    let raw = if raw01.is_nan() { 0.0 } else { raw01.clamp(0.0, 1.0) };
    let a = if alpha.is_nan() { DEFAULT_ALPHA } else { alpha.clamp(0.0, 1.0) };
    let curl = if state.initialized {
        (a * raw + (1.0 - a) * state.curl).clamp(0.0, 1.0)
    } else {
        raw
    };
    (
        curl,
        SmoothingState {
            curl,
            initialized: true,
        },
    )
}
