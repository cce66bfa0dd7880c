//! Test and helper mocks for hand_core

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hand_traits::{Clock, Transport};

/// Deterministic clock whose time only moves when told to.
///
/// now() = origin + offset
/// sleep(d) advances internal time by d without actually sleeping.
#[derive(Debug, Clone)]
pub struct TestClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.origin + off
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[derive(Debug, Default)]
struct Recorded {
    frames: Vec<String>,
    connected: bool,
    fail_writes: bool,
}

/// Transport that records every frame it is given. Clones share state, so a
/// test can keep one handle while the dispatcher owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingTransport {
    pub fn connected() -> Self {
        let t = Self::default();
        t.set_connected(true);
        t
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        if let Ok(mut g) = self.inner.lock() {
            g.connected = connected;
        }
    }

    /// Make subsequent writes fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut g) = self.inner.lock() {
            g.fail_writes = fail;
        }
    }

    pub fn frames(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|g| g.frames.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut g) = self.inner.lock() {
            g.frames.clear();
        }
    }
}

impl Transport for RecordingTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut g = self
            .inner
            .lock()
            .map_err(|_| std::io::Error::other("recording transport poisoned"))?;
        if g.fail_writes {
            return Err(Box::new(std::io::Error::other("simulated write failure")));
        }
        g.frames.push(String::from_utf8_lossy(bytes).into_owned());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().map(|g| g.connected).unwrap_or(false)
    }
}
