//! Common time helpers for hand_core.

use std::time::Duration;

/// Convert a user-facing seconds value into a `Duration`.
/// - Negative and NaN inputs map to zero.
/// - Values beyond `Duration`'s range saturate.
#[inline]
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Milliseconds as a `Duration`, floored at 1 ms so interval gates never spin.
#[inline]
pub fn interval_ms(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}
