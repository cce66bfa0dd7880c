#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas, calibration CSV parsing and program files for the hand controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Calibration CSV loader enforces headers and requires every finger exactly once.
//! - `ProgramFile` is the on-disk form of a motion program used by the front end.
//! - Pose frame CSVs replay recorded camera curls.
use serde::{Deserialize, Serialize};

/// Finger order shared by calibration rows and multi-joint frames.
pub const FINGER_NAMES: [&str; 5] = ["thumb", "index", "middle", "ring", "pinky"];

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DispatcherCfg {
    /// Minimum spacing between physical flushes to the link (ms).
    pub command_interval_ms: u64,
}

impl Default for DispatcherCfg {
    fn default() -> Self {
        Self {
            command_interval_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaybackCfg {
    /// Fixed pause after each Move step so the servos can physically arrive (ms).
    pub settle_delay_ms: u64,
}

impl Default for PlaybackCfg {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SmoothingCfg {
    /// EMA factor; closer to 1.0 = more responsive, less smoothing. Range: (0.0, 1.0].
    pub alpha: f32,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self { alpha: 0.35 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinkCfg {
    /// Device node of the wireless serial link (e.g. /dev/rfcomm0).
    /// When absent the front end drives a simulated hand.
    pub device: Option<String>,
    /// Depth of the writer thread queue; frames beyond it are dropped.
    pub queue_depth: usize,
}

impl Default for LinkCfg {
    fn default() -> Self {
        Self {
            device: None,
            queue_depth: 64,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub dispatcher: DispatcherCfg,
    pub playback: PlaybackCfg,
    pub smoothing: SmoothingCfg,
    pub link: LinkCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Dispatcher
        if self.dispatcher.command_interval_ms == 0 {
            eyre::bail!("dispatcher.command_interval_ms must be > 0");
        }
        if self.dispatcher.command_interval_ms > 10_000 {
            eyre::bail!("dispatcher.command_interval_ms is unreasonably large (>10s)");
        }

        // Playback
        if self.playback.settle_delay_ms > 60_000 {
            eyre::bail!("playback.settle_delay_ms is unreasonably large (>60s)");
        }

        // Smoothing
        let alpha = self.smoothing.alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            eyre::bail!("smoothing.alpha must be in (0.0, 1.0]");
        }

        // Link
        if self.link.queue_depth == 0 {
            eyre::bail!("link.queue_depth must be >= 1");
        }
        if let Some(dev) = &self.link.device
            && dev.trim().is_empty()
        {
            eyre::bail!("link.device must not be empty when set");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// Calibration CSV schema.
///
/// Expected headers:
/// finger,open,closed
///
/// Example:
/// finger,open,closed
/// thumb,0.12,0.81
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalibrationRow {
    pub finger: String,
    pub open: f32,
    pub closed: f32,
}

/// Raw (open, closed) curl samples per finger, in `FINGER_NAMES` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationTable {
    pub fingers: [(f32, f32); 5],
}

impl CalibrationTable {
    /// Build a table from rows; every finger must appear exactly once.
    pub fn from_rows(rows: Vec<CalibrationRow>) -> eyre::Result<Self> {
        let mut slots: [Option<(f32, f32)>; 5] = [None; 5];
        for row in rows {
            let name = row.finger.trim().to_ascii_lowercase();
            let Some(idx) = FINGER_NAMES.iter().position(|f| *f == name) else {
                eyre::bail!("unknown finger {:?} in calibration", row.finger);
            };
            if !row.open.is_finite() || !row.closed.is_finite() {
                eyre::bail!("calibration for {name} has non-finite samples");
            }
            if slots[idx].replace((row.open, row.closed)).is_some() {
                eyre::bail!("calibration lists {name} more than once");
            }
        }
        let mut fingers = [(0.0f32, 0.0f32); 5];
        for (i, slot) in slots.iter().enumerate() {
            match slot {
                Some(pair) => fingers[i] = *pair,
                None => eyre::bail!("calibration is missing finger {}", FINGER_NAMES[i]),
            }
        }
        Ok(Self { fingers })
    }
}

impl TryFrom<Vec<CalibrationRow>> for CalibrationTable {
    type Error = eyre::Report;
    fn try_from(rows: Vec<CalibrationRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<CalibrationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["finger", "open", "closed"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'finger,open,closed', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    CalibrationTable::try_from(rows)
}

/// Write a table in the format `load_calibration_csv` reads.
pub fn save_calibration_csv(path: &std::path::Path, table: &CalibrationTable) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create calibration CSV {:?}: {}", path, e))?;
    for (name, (open, closed)) in FINGER_NAMES.iter().zip(table.fingers) {
        wtr.serialize(CalibrationRow {
            finger: (*name).to_string(),
            open,
            closed,
        })
        .map_err(|e| eyre::eyre!("write calibration CSV {:?}: {}", path, e))?;
    }
    wtr.flush()
        .map_err(|e| eyre::eyre!("flush calibration CSV {:?}: {}", path, e))?;
    Ok(())
}

/// Recorded camera frames: `thumb,index,middle,ring,pinky` raw curls per row.
/// A row with every field empty means the hand was not detected in that frame.
pub fn load_pose_frames_csv(path: &std::path::Path) -> eyre::Result<Vec<Option<[f32; 5]>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open pose frames CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != FINGER_NAMES {
        eyre::bail!(
            "pose frames CSV must have headers '{}', got: {}",
            FINGER_NAMES.join(","),
            actual.join(",")
        );
    }

    let mut frames = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = rec.map_err(|e| eyre::eyre!("invalid CSV row {line}: {e}"))?;
        if rec.iter().all(str::is_empty) {
            frames.push(None);
            continue;
        }
        let mut curls = [0.0f32; 5];
        for (i, slot) in curls.iter_mut().enumerate() {
            let field = rec.get(i).unwrap_or("");
            *slot = field.parse::<f32>().map_err(|e| {
                eyre::eyre!("invalid CSV row {line}: {} = {field:?}: {e}", FINGER_NAMES[i])
            })?;
        }
        frames.push(Some(curls));
    }
    Ok(frames)
}

/// One entry of a program file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CommandEntry {
    Move {
        thumb: i64,
        index: i64,
        middle: i64,
        ring: i64,
        pinky: i64,
        wrist: i64,
    },
    Wait {
        seconds: f64,
    },
}

/// Motion program as stored on disk.
///
/// ```toml
/// name = "wave"
/// [[commands]]
/// type = "move"
/// thumb = 0
/// index = 180
/// middle = 180
/// ring = 180
/// pinky = 150
/// wrist = 90
/// [[commands]]
/// type = "wait"
/// seconds = 1.0
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct ProgramFile {
    pub name: String,
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

pub fn load_program_toml(s: &str) -> Result<ProgramFile, toml::de::Error> {
    toml::from_str::<ProgramFile>(s)
}

impl ProgramFile {
    /// Angles are clamped later and never rejected; only structural problems fail here.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.name.trim().is_empty() {
            eyre::bail!("program name must not be empty");
        }
        for (i, cmd) in self.commands.iter().enumerate() {
            if let CommandEntry::Wait { seconds } = cmd
                && (!seconds.is_finite() || *seconds < 0.0)
            {
                eyre::bail!("commands[{i}].seconds must be a finite value >= 0");
            }
        }
        Ok(())
    }
}
