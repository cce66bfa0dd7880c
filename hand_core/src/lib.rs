#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core motion pipeline for the servo hand (hardware-agnostic).
//!
//! Every byte that reaches the hand goes through `hand_traits::Transport`.
//!
//! ## Architecture
//!
//! - **Joints**: ranges, clamping and wire codes (`joint`)
//! - **Protocol**: the textual command frames and their decoder (`protocol`)
//! - **Pose**: calibration, exponential smoothing and curl→angle mapping
//!   (`calibration`, `smoothing`, `pose`, `wizard`)
//! - **Dispatch**: rate-limited, last-write-wins transmission (`dispatcher`)
//! - **Programs**: stored command lists and their playback (`program`,
//!   `playback`, `editor`)
//! - **Control loop**: one thread owning all of the above (`controller`)
//!
//! ## Timing
//!
//! Nothing here sleeps on its own. Delays are single-slot `timer::Timer`s
//! polled against a `hand_traits::Clock`, so tests drive time explicitly.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod joint;
pub mod mocks;
pub mod playback;
pub mod pose;
pub mod program;
pub mod protocol;
pub mod smoothing;
pub mod timer;
pub mod util;
pub mod wizard;

pub use builder::ControllerBuilder;
pub use calibration::{CalibrationSet, FingerCalibration};
pub use config::{DispatcherCfg, PlaybackCfg, SmoothingCfg};
pub use controller::{ControlInput, Controller, ControllerHandle, ControllerStatus};
pub use dispatcher::{DispatchStats, Dispatcher, MoveSink};
pub use editor::ProgramEditor;
pub use error::{BuildError, HandError, ProtocolError, Report, Result};
pub use joint::{Finger, FingerAngles, Joint, TargetPositions};
pub use playback::{Direction, PlaybackEngine, PlaybackState, StepEvent, TraversalMode};
pub use pose::{PoseFrame, PoseNormalizer, RawCurls};
pub use program::{CommandId, CommandKind, Program, ProgramCommand};
pub use protocol::{Channel, WireCommand};
pub use wizard::{CalibrationStep, CalibrationWizard};
