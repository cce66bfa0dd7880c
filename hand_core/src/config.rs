//! Runtime configuration of the pipeline stages.

use std::time::Duration;

use crate::smoothing::DEFAULT_ALPHA;

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherCfg {
    /// Global gate: at most one flush of pending writes per interval.
    pub command_interval: Duration,
}

impl Default for DispatcherCfg {
    fn default() -> Self {
        Self {
            command_interval: Duration::from_millis(500),
        }
    }
}

/// Playback configuration.
#[derive(Debug, Clone)]
pub struct PlaybackCfg {
    /// Pause after every Move step so the servos can physically arrive.
    /// Not part of the program data.
    pub settle_delay: Duration,
}

impl Default for PlaybackCfg {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Pose smoothing configuration.
#[derive(Debug, Clone)]
pub struct SmoothingCfg {
    /// EMA factor in (0, 1]; closer to 1.0 = more responsive.
    pub alpha: f32,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}
