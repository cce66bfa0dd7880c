//! The control timeline.
//!
//! One `Controller` owns the dispatcher, the program editor (and its playback
//! engine) and the pose normalizer. Every mutation of their state happens on
//! the controller: callers on other threads send `ControlInput`s through a
//! bounded channel, and the controller thread sleeps until the next timer is
//! due or an input arrives.
//!
//! Safety: each spawned controller runs exactly one thread, shut down and
//! joined when its handle is dropped.
use crossbeam_channel as xch;
use hand_traits::{Clock, Transport};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::calibration::CalibrationSet;
use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::editor::ProgramEditor;
use crate::error::{HandError, Report, Result};
use crate::joint::Joint;
use crate::playback::{PlaybackState, StepEvent, TraversalMode};
use crate::pose::{PoseFrame, PoseNormalizer};
use crate::timer::earliest;

/// Upper bound on how long the thread sleeps with no timer armed.
const IDLE_WAIT: Duration = Duration::from_millis(250);
/// Steps executed back-to-back before inputs are checked again; bounds the
/// work done for programs made only of zero-length waits.
const MAX_STEPS_PER_WAKE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    /// Camera frame; `None` means the hand was not detected.
    Pose(PoseFrame),
    /// Operator slider for one joint.
    Manual(Joint, i64),
    Play(TraversalMode),
    Stop,
    /// Replace the pose calibration (e.g. after the wizard completes).
    Calibrate(CalibrationSet),
    Shutdown,
}

/// Snapshot published by the controller after every iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerStatus {
    pub playback: PlaybackState,
    pub steps_executed: u64,
    pub pending_writes: usize,
    pub dispatch: DispatchStats,
}

pub struct Controller<T: Transport, C: Clock> {
    dispatcher: Dispatcher<T>,
    editor: ProgramEditor,
    normalizer: PoseNormalizer,
    clock: C,
}

impl<T: Transport, C: Clock> core::fmt::Debug for Controller<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("dispatcher", &self.dispatcher)
            .field("playback", &self.editor.state())
            .finish()
    }
}

impl<T: Transport, C: Clock> Controller<T, C> {
    pub fn new(
        dispatcher: Dispatcher<T>,
        editor: ProgramEditor,
        normalizer: PoseNormalizer,
        clock: C,
    ) -> Self {
        Self {
            dispatcher,
            editor,
            normalizer,
            clock,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<T> {
        &mut self.dispatcher
    }

    pub fn editor(&self) -> &ProgramEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ProgramEditor {
        &mut self.editor
    }

    pub fn normalizer(&self) -> &PoseNormalizer {
        &self.normalizer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            playback: self.editor.state(),
            steps_executed: self.editor.engine().steps_executed(),
            pending_writes: self.dispatcher.pending_len(),
            dispatch: self.dispatcher.stats(),
        }
    }

    /// Apply one input. Returns `false` once shutdown was requested.
    pub fn handle(&mut self, input: ControlInput) -> bool {
        let now = self.clock.now();
        match input {
            ControlInput::Pose(frame) => {
                if let Some(angles) = self.normalizer.handle_frame(frame) {
                    self.dispatcher.set_fingers(angles, now);
                }
            }
            ControlInput::Manual(joint, value) => {
                self.dispatcher.set_joint(joint, value, now);
            }
            ControlInput::Play(mode) => {
                self.editor.play(mode, now, &mut self.dispatcher);
            }
            ControlInput::Stop => self.editor.stop(),
            ControlInput::Calibrate(set) => {
                self.normalizer.set_calibration(set);
                tracing::info!("pose calibration updated");
            }
            ControlInput::Shutdown => {
                self.editor.stop();
                return false;
            }
        }
        true
    }

    /// Fire whatever timers are due: the dispatcher gate first, so writes
    /// held back from an earlier step go out before the next step replaces
    /// them, then at most one playback step.
    pub fn tick(&mut self) -> Option<StepEvent> {
        let now = self.clock.now();
        self.dispatcher.poll(now);
        self.editor.poll(now, &mut self.dispatcher)
    }

    /// Earliest armed timer across playback and dispatch.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.editor.next_deadline(), self.dispatcher.next_deadline())
    }

    /// Run the control loop on a dedicated thread.
    pub fn spawn(self, queue_depth: usize) -> ControllerHandle<T, C>
    where
        T: Send + 'static,
        C: Send + 'static,
    {
        let (tx, rx) = xch::bounded(queue_depth.max(1));
        let status = Arc::new(Mutex::new(self.status()));
        let status_clone = status.clone();

        let join_handle = std::thread::spawn(move || {
            let mut ctrl = self;
            loop {
                for _ in 0..MAX_STEPS_PER_WAKE {
                    if ctrl.tick().is_none() {
                        break;
                    }
                }
                if let Ok(mut s) = status_clone.lock() {
                    *s = ctrl.status();
                }

                let wait = ctrl
                    .next_deadline()
                    .map(|d| d.saturating_duration_since(ctrl.clock.now()))
                    .unwrap_or(IDLE_WAIT)
                    .min(IDLE_WAIT);
                match rx.recv_timeout(wait) {
                    Ok(input) => {
                        if !ctrl.handle(input) {
                            tracing::debug!("controller received shutdown");
                            break;
                        }
                    }
                    Err(xch::RecvTimeoutError::Timeout) => {}
                    Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("controller inputs disconnected, exiting thread");
                        break;
                    }
                }
            }
            if let Ok(mut s) = status_clone.lock() {
                *s = ctrl.status();
            }
            tracing::trace!("controller thread exiting cleanly");
            ctrl
        });

        ControllerHandle {
            tx,
            status,
            join_handle: Some(join_handle),
        }
    }
}

pub struct ControllerHandle<T: Transport, C: Clock> {
    tx: xch::Sender<ControlInput>,
    status: Arc<Mutex<ControllerStatus>>,
    join_handle: Option<std::thread::JoinHandle<Controller<T, C>>>,
}

impl<T: Transport, C: Clock> ControllerHandle<T, C> {
    /// Queue an input without blocking. Fails when the queue is full or the
    /// controller has exited.
    pub fn send(&self, input: ControlInput) -> Result<()> {
        self.tx.try_send(input).map_err(|e| {
            let reason = match e {
                xch::TrySendError::Full(_) => "control queue full",
                xch::TrySendError::Disconnected(_) => "controller stopped",
            };
            Report::new(HandError::State(reason.to_string()))
        })
    }

    /// Latest published status.
    pub fn status(&self) -> ControllerStatus {
        self.status.lock().map(|g| *g).unwrap_or_default()
    }

    /// Stop the thread and hand the controller back for inspection.
    pub fn join(mut self) -> Result<Controller<T, C>> {
        let Some(handle) = self.join_handle.take() else {
            return Err(Report::new(HandError::State("controller already joined".into())));
        };
        let _ = self.tx.send(ControlInput::Shutdown);
        handle
            .join()
            .map_err(|_| Report::new(HandError::State("controller thread panicked".into())))
    }
}

impl<T: Transport, C: Clock> Drop for ControllerHandle<T, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            // Blocking send: shutdown must not be lost to a full queue.
            let _ = self.tx.send(ControlInput::Shutdown);
            match handle.join() {
                Ok(_) => {
                    tracing::trace!("controller thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "controller thread panicked during shutdown");
                }
            }
        }
    }
}
