//! Rate-limited, coalescing writer in front of the slow wireless link.
//!
//! Writes are keyed by `Channel`. The gate is global and leading-edge: a write
//! arriving at least one interval after the previous flush goes out at once;
//! anything sooner waits for `last_flush + interval`. While waiting only the
//! most recent value per channel survives, and every channel with a pending
//! value is written exactly once when the gate fires. Nothing is sent while
//! nothing is pending.

use std::collections::BTreeMap;
use std::time::Instant;

use hand_traits::Transport;

use crate::config::DispatcherCfg;
use crate::joint::{FingerAngles, Joint, TargetPositions};
use crate::protocol::{Channel, WireCommand};
use crate::timer::Timer;

/// Receiver of whole-hand targets. Playback drives this seam.
pub trait MoveSink {
    fn send_positions(&mut self, positions: &TargetPositions, now: Instant);
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Accepted submissions (connected link).
    pub submitted: u64,
    /// Submissions that replaced a pending value on the same channel.
    pub coalesced: u64,
    /// Frames handed to the transport successfully.
    pub transmitted: u64,
    /// Writes discarded because the link was down.
    pub dropped_disconnected: u64,
    /// Frames the transport refused.
    pub write_errors: u64,
}

pub struct Dispatcher<T: Transport> {
    transport: T,
    cfg: DispatcherCfg,
    pending: BTreeMap<Channel, WireCommand>,
    gate: Timer<()>,
    last_flush: Option<Instant>,
    stats: DispatchStats,
}

impl<T: Transport> core::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("interval", &self.cfg.command_interval)
            .field("pending", &self.pending.len())
            .field("gate_armed", &self.gate.is_pending())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, cfg: DispatcherCfg) -> Self {
        Self {
            transport,
            cfg,
            pending: BTreeMap::new(),
            gate: Timer::new(),
            last_flush: None,
            stats: DispatchStats::default(),
        }
    }

    pub fn cfg(&self) -> &DispatcherCfg {
        &self.cfg
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// When the next flush is due, if anything is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gate.deadline()
    }

    /// Submit `cmd` on its channel. Never blocks.
    ///
    /// Transmits right away when the gate is open; otherwise the value waits,
    /// replacing whatever was pending on the same channel. With the link down
    /// only this write is dropped; callers re-submit after reconnecting.
    pub fn submit(&mut self, cmd: WireCommand, now: Instant) {
        if self.enqueue(cmd) {
            self.release(now);
        }
    }

    fn enqueue(&mut self, cmd: WireCommand) -> bool {
        if !self.transport.is_connected() {
            self.stats.dropped_disconnected += 1;
            tracing::debug!(frame = %cmd, "link down; write dropped");
            return false;
        }
        self.stats.submitted += 1;
        if let Some(prev) = self.pending.insert(cmd.channel(), cmd) {
            self.stats.coalesced += 1;
            tracing::trace!(channel = %cmd.channel(), superseded = %prev, "coalesced write");
        }
        true
    }

    /// Flush now if the gate is open, else arm it for when it reopens.
    fn release(&mut self, now: Instant) {
        if self.gate.is_pending() {
            return;
        }
        match self.reopens_at() {
            Some(at) if at > now => self.gate.schedule(at, ()),
            _ => {
                self.flush(now);
            }
        }
    }

    fn reopens_at(&self) -> Option<Instant> {
        self.last_flush
            .and_then(|t| t.checked_add(self.cfg.command_interval))
    }

    pub fn set_joint(&mut self, joint: Joint, value: i64, now: Instant) {
        self.submit(WireCommand::single(joint, value), now);
    }

    pub fn set_fingers(&mut self, angles: FingerAngles, now: Instant) {
        self.submit(WireCommand::Fingers(angles), now);
    }

    /// Drop everything pending and disarm the gate. Idempotent.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
        self.gate.cancel();
    }

    /// Flush if the gate is due. Returns the number of frames written.
    pub fn poll(&mut self, now: Instant) -> usize {
        if self.gate.take_due(now).is_none() {
            return 0;
        }
        self.flush(now)
    }

    fn flush(&mut self, now: Instant) -> usize {
        let batch = std::mem::take(&mut self.pending);
        if batch.is_empty() {
            return 0;
        }
        self.last_flush = Some(now);
        if !self.transport.is_connected() {
            self.stats.dropped_disconnected += batch.len() as u64;
            tracing::debug!(dropped = batch.len(), "link lost before flush; pending writes dropped");
            return 0;
        }
        let mut sent = 0;
        for cmd in batch.into_values() {
            match self.transport.write(&cmd.to_bytes()) {
                Ok(()) => {
                    sent += 1;
                    self.stats.transmitted += 1;
                    tracing::trace!(frame = %cmd, "frame sent");
                }
                Err(e) => {
                    self.stats.write_errors += 1;
                    tracing::warn!(error = %e, frame = %cmd, "link write failed");
                }
            }
        }
        sent
    }
}

impl<T: Transport> MoveSink for Dispatcher<T> {
    /// Composite finger write plus a separate wrist write, released together.
    fn send_positions(&mut self, positions: &TargetPositions, now: Instant) {
        let fingers = self.enqueue(WireCommand::Fingers(positions.fingers()));
        let wrist = self.enqueue(WireCommand::single(
            Joint::Wrist,
            i64::from(positions.wrist()),
        ));
        if fingers || wrist {
            self.release(now);
        }
    }
}
