//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use hand_core::{Joint, TraversalMode};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "handctl", version, about = "Servo hand motion CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Optional pose calibration CSV (strict header: finger,open,closed)
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log and report as JSON instead of plain text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); overrides `[logging].level`
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move one joint (value is clamped to the joint's range)
    Send {
        /// Joint name or wire code (thumb|index|middle|ring|pinky|wrist or T|I|M|R|P|W)
        #[arg(long)]
        joint: Joint,
        /// Target angle in degrees
        #[arg(long, allow_negative_numbers = true)]
        angle: i64,
    },
    /// Replay recorded camera curls (CSV: thumb,index,middle,ring,pinky)
    Pose {
        #[arg(long, value_name = "FILE")]
        frames: PathBuf,
        /// Replay rate in frames per second
        #[arg(long, default_value_t = 30)]
        fps: u32,
    },
    /// Play a program file
    Play {
        #[arg(long, value_name = "FILE")]
        program: PathBuf,
        /// Traversal mode: once|loop|bounce
        #[arg(long, default_value = "once")]
        mode: TraversalMode,
        /// Stop after this long (required to end loop/bounce without Ctrl-C)
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
    },
    /// Print the wire frame for a command without sending it
    Encode {
        #[arg(long, conflicts_with = "fingers", requires = "angle")]
        joint: Option<Joint>,
        #[arg(long, allow_negative_numbers = true)]
        angle: Option<i64>,
        /// Five comma-separated finger angles (thumb,index,middle,ring,pinky)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        fingers: Option<Vec<i64>>,
    },
    /// Run the guided calibration over recorded captures and write a calibration CSV
    Calibrate {
        /// One detected frame per step (CSV: thumb,index,middle,ring,pinky)
        #[arg(long, value_name = "FILE")]
        frames: PathBuf,
        /// Where to write the calibration CSV
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Validate config/calibration and report the transport in use
    SelfCheck,
}
