//! Transports for the servo hand.
//!
//! - `SimulatedHand`: in-process stand-in for the firmware. Decodes every frame
//!   and tracks the resulting joint angles.
//! - `LinkTransport`: forwards frames to any byte sink (typically the RFCOMM
//!   device node of the hand's Bluetooth serial link) from a writer thread.

pub mod error;
pub mod link;

pub use error::LinkError;
pub use link::LinkTransport;

use hand_core::{Joint, WireCommand};
use hand_traits::Transport;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct HandState {
    angles: [u16; 6],
    frames: Vec<String>,
    rejected: usize,
    connected: bool,
}

impl Default for HandState {
    fn default() -> Self {
        let mut angles = [0; 6];
        angles[Joint::Wrist as usize] = 90;
        Self {
            angles,
            frames: Vec::new(),
            rejected: 0,
            connected: true,
        }
    }
}

/// Simulated hand. Clones share state so one copy can be inspected while
/// another is owned by the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct SimulatedHand {
    state: Arc<Mutex<HandState>>,
}

impl SimulatedHand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.connected = connected;
        }
    }

    /// Current angle of a joint as last commanded.
    pub fn angle(&self, joint: Joint) -> u16 {
        self.state
            .lock()
            .map(|s| s.angles[joint as usize])
            .unwrap_or_default()
    }

    /// Every joint's angle in `Joint::ALL` order.
    pub fn angles(&self) -> [(Joint, u16); 6] {
        let a = self.state.lock().map(|s| s.angles).unwrap_or_default();
        Joint::ALL.map(|j| (j, a[j as usize]))
    }

    /// Accepted frames, oldest first.
    pub fn frames(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.frames.clone())
            .unwrap_or_default()
    }

    /// Frames the firmware would have ignored.
    pub fn rejected(&self) -> usize {
        self.state.lock().map(|s| s.rejected).unwrap_or(0)
    }

    fn apply(state: &mut HandState, cmd: WireCommand) {
        match cmd {
            WireCommand::Fingers(f) => {
                for (joint, v) in Joint::ALL.iter().zip(f.as_array()) {
                    state.angles[*joint as usize] = v;
                }
            }
            WireCommand::Single(joint, v) => state.angles[joint as usize] = v,
        }
    }
}

impl Transport for SimulatedHand {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut s = self
            .state
            .lock()
            .map_err(|_| std::io::Error::other("simulated hand state poisoned"))?;
        if !s.connected {
            return Err(Box::new(LinkError::Disconnected));
        }
        let text = String::from_utf8_lossy(bytes);
        match text.parse::<WireCommand>() {
            Ok(cmd) => {
                Self::apply(&mut s, cmd);
                s.frames.push(text.into_owned());
                tracing::trace!(frame = %cmd, "simulated hand applied frame");
                Ok(())
            }
            Err(e) => {
                s.rejected += 1;
                tracing::debug!(error = %e, frame = %text, "simulated hand ignored frame");
                Err(Box::new(e))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.state.lock().map(|s| s.connected).unwrap_or(false)
    }
}
