//! Single-slot cancellable timer for the cooperative control timeline.
//!
//! A `Timer` holds at most one pending action. Scheduling replaces whatever was
//! pending, so two timers of the same owner can never coexist. Nothing runs on
//! its own: the owner polls `take_due(now)` from the control loop.

use std::time::{Duration, Instant};

/// Stand-in deadline for delays `Instant` cannot represent.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Pending<T> {
    due: Instant,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct Timer<T> {
    pending: Option<Pending<T>>,
}

impl<T> Default for Timer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Timer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, cancelling any action already pending.
    pub fn schedule(&mut self, due: Instant, payload: T) {
        self.pending = Some(Pending { due, payload });
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, payload: T) {
        let due = now
            .checked_add(delay)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        self.schedule(due, payload);
    }

    /// Drop the pending action. Cancelling an idle timer is a no-op.
    /// Returns whether something was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Fire the pending action if it is due. A fired action is consumed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.due <= now => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }
}

/// Earliest of two optional deadlines.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}
