//! Subcommand execution: transport selection, controller assembly and reports.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::{Result, WrapErr};
use hand_core::{
    CalibrationSet, CalibrationWizard, ControlInput, ControllerBuilder, DispatchStats, Dispatcher, FingerAngles,
    HandError, Joint, PlaybackState, Program, Report, TraversalMode, WireCommand,
};
use hand_hardware::{LinkTransport, SimulatedHand};
use hand_traits::{Clock, MonotonicClock, Transport};
use serde_json::json;

use crate::cli::Commands;

const POLL: Duration = Duration::from_millis(10);

/// Transport selected from `[link]`: the real link when a device is
/// configured, otherwise the simulated hand.
pub enum Backend {
    Simulated(SimulatedHand),
    Link(LinkTransport),
}

impl Backend {
    pub fn open(cfg: &hand_config::Config) -> Result<Self> {
        match &cfg.link.device {
            Some(dev) => {
                let link = LinkTransport::open(Path::new(dev), cfg.link.queue_depth)
                    .map_err(Report::new)
                    .wrap_err_with(|| format!("open hand link {dev}"))?;
                Ok(Self::Link(link))
            }
            None => Ok(Self::Simulated(SimulatedHand::new())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Simulated(_) => "simulated".to_string(),
            Self::Link(_) => "link".to_string(),
        }
    }

    fn simulated(&self) -> Option<SimulatedHand> {
        match self {
            Self::Simulated(h) => Some(h.clone()),
            Self::Link(_) => None,
        }
    }
}

impl Transport for Backend {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self {
            Self::Simulated(h) => h.write(bytes),
            Self::Link(l) => l.write(bytes),
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            Self::Simulated(h) => h.is_connected(),
            Self::Link(l) => l.is_connected(),
        }
    }
}

/// Everything a subcommand needs from the command line and config files.
pub struct RunCtx {
    pub cfg: hand_config::Config,
    pub calibration: Option<CalibrationSet>,
    pub json: bool,
    pub shutdown: Arc<AtomicBool>,
}

pub fn run(ctx: &RunCtx, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Send { joint, angle } => run_send(ctx, joint, angle),
        Commands::Pose { frames, fps } => run_pose(ctx, &frames, fps),
        Commands::Play {
            program,
            mode,
            duration_ms,
        } => run_play(ctx, &program, mode, duration_ms.map(Duration::from_millis)),
        Commands::Encode {
            joint,
            angle,
            fingers,
        } => run_encode(joint, angle, fingers.as_deref()),
        Commands::Calibrate { frames, out } => run_calibrate(ctx, &frames, &out),
        Commands::SelfCheck => run_self_check(ctx),
    }
}

fn run_send(ctx: &RunCtx, joint: Joint, angle: i64) -> Result<()> {
    let backend = Backend::open(&ctx.cfg)?;
    let sim = backend.simulated();
    let clock = MonotonicClock::new();
    let mut dispatcher = Dispatcher::new(backend, (&ctx.cfg.dispatcher).into());
    dispatcher.set_joint(joint, angle, clock.now());
    while let Some(due) = dispatcher.next_deadline() {
        clock.sleep(due.saturating_duration_since(clock.now()));
        dispatcher.poll(clock.now());
    }
    let stats = dispatcher.stats();
    tracing::info!(%joint, angle, transmitted = stats.transmitted, "send complete");
    report(ctx, &stats, sim.as_ref());
    Ok(())
}

fn run_pose(ctx: &RunCtx, frames: &Path, fps: u32) -> Result<()> {
    let frames = hand_config::load_pose_frames_csv(frames)?;
    let backend = Backend::open(&ctx.cfg)?;
    let sim = backend.simulated();
    let mut builder = ControllerBuilder::new()
        .with_transport(backend)
        .apply_config(&ctx.cfg);
    if let Some(cal) = ctx.calibration {
        builder = builder.calibration(cal);
    }
    let handle = builder.build()?.spawn(ctx.cfg.link.queue_depth);

    let period = Duration::from_secs(1) / fps.max(1);
    let mut skipped = 0usize;
    for frame in &frames {
        if ctx.shutdown.load(Ordering::Relaxed) {
            tracing::info!("interrupted; stopping pose replay");
            break;
        }
        if let Err(e) = handle.send(ControlInput::Pose(*frame)) {
            skipped += 1;
            tracing::debug!(error = %e, "pose frame skipped");
        }
        std::thread::sleep(period);
    }
    if skipped > 0 {
        tracing::warn!(skipped, "pose frames skipped because the control queue was full");
    }
    drain(&handle, ctx);
    let ctrl = handle.join()?;
    report(ctx, &ctrl.dispatcher().stats(), sim.as_ref());
    Ok(())
}

fn run_play(
    ctx: &RunCtx,
    path: &Path,
    mode: TraversalMode,
    duration: Option<Duration>,
) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read program file {}", path.display()))?;
    let file = hand_config::load_program_toml(&text)
        .wrap_err_with(|| format!("parse program file {}", path.display()))?;
    file.validate()?;
    let program = Program::from(&file);
    if program.is_empty() {
        return Err(Report::new(HandError::EmptyProgram));
    }
    if duration.is_none() && mode != TraversalMode::Once {
        tracing::info!(%mode, "no --duration-ms given; press Ctrl-C to stop");
    }

    let backend = Backend::open(&ctx.cfg)?;
    let sim = backend.simulated();
    let handle = ControllerBuilder::new()
        .with_transport(backend)
        .apply_config(&ctx.cfg)
        .program(program)
        .build()?
        .spawn(ctx.cfg.link.queue_depth);
    handle.send(ControlInput::Play(mode))?;

    let start = Instant::now();
    loop {
        std::thread::sleep(POLL);
        if ctx.shutdown.load(Ordering::Relaxed) {
            tracing::info!("interrupted; stopping playback");
            break;
        }
        if duration.is_some_and(|d| start.elapsed() >= d) {
            break;
        }
        let status = handle.status();
        if status.steps_executed > 0 && status.playback == PlaybackState::Idle {
            break;
        }
    }
    if let Err(e) = handle.send(ControlInput::Stop) {
        tracing::debug!(error = %e, "stop not queued; shutdown will stop playback");
    }
    drain(&handle, ctx);
    let ctrl = handle.join()?;
    let steps = ctrl.editor().engine().steps_executed();
    tracing::info!(steps, elapsed_ms = start.elapsed().as_millis() as u64, "play complete");
    report(ctx, &ctrl.dispatcher().stats(), sim.as_ref());
    Ok(())
}

/// Wait until the controller has flushed whatever is still pending.
fn drain<T: Transport, C: Clock>(handle: &hand_core::ControllerHandle<T, C>, ctx: &RunCtx) {
    let limit = Duration::from_millis(ctx.cfg.dispatcher.command_interval_ms)
        .saturating_mul(2)
        .saturating_add(Duration::from_millis(250));
    let start = Instant::now();
    // Let the controller publish a status that reflects the last input.
    std::thread::sleep(POLL);
    while handle.status().pending_writes > 0 && start.elapsed() < limit {
        std::thread::sleep(POLL);
    }
}

fn run_encode(joint: Option<Joint>, angle: Option<i64>, fingers: Option<&[i64]>) -> Result<()> {
    let cmd = match (joint, angle, fingers) {
        (Some(j), Some(a), None) => WireCommand::single(j, a),
        (None, None, Some(f)) => {
            let arr: [i64; 5] = f
                .try_into()
                .map_err(|_| eyre::eyre!("--fingers needs exactly 5 values, got {}", f.len()))?;
            WireCommand::Fingers(FingerAngles::new(arr))
        }
        _ => eyre::bail!("encode needs either --joint with --angle, or --fingers"),
    };
    println!("{cmd}");
    Ok(())
}

fn run_calibrate(ctx: &RunCtx, frames: &Path, out: &Path) -> Result<()> {
    let frames = hand_config::load_pose_frames_csv(frames)?;
    let mut wizard = CalibrationWizard::new();
    for raw in frames.into_iter().flatten() {
        let idx = wizard.step_index() + 1;
        let Some(step) = wizard.capture(raw) else {
            break;
        };
        if !ctx.json {
            println!("step {idx}/{}: {}", wizard.total_steps(), step.instruction());
        }
    }
    let Some(set) = wizard.calibration() else {
        return Err(Report::new(HandError::State(format!(
            "calibration incomplete: captured {} of {} steps",
            wizard.step_index(),
            wizard.total_steps()
        ))));
    };
    hand_config::save_calibration_csv(out, &(&set).into())?;
    tracing::info!(path = %out.display(), "calibration written");
    if ctx.json {
        println!("{}", json!({ "ok": true, "out": out.display().to_string() }));
    } else {
        println!("calibration written to {}", out.display());
    }
    Ok(())
}

fn run_self_check(ctx: &RunCtx) -> Result<()> {
    let backend = Backend::open(&ctx.cfg)?;
    let transport = backend.describe();
    let device = ctx.cfg.link.device.clone();
    let connected = backend.is_connected();
    if ctx.json {
        println!(
            "{}",
            json!({
                "ok": true,
                "transport": transport,
                "device": device,
                "connected": connected,
                "calibration": ctx.calibration.is_some(),
                "command_interval_ms": ctx.cfg.dispatcher.command_interval_ms,
            })
        );
    } else {
        println!("config ok");
        match device {
            Some(d) => println!("transport: {transport} ({d})"),
            None => println!("transport: {transport}"),
        }
        println!(
            "calibration: {}",
            if ctx.calibration.is_some() {
                "loaded"
            } else {
                "default"
            }
        );
    }
    Ok(())
}

fn report(ctx: &RunCtx, stats: &DispatchStats, sim: Option<&SimulatedHand>) {
    let joints = sim.map(SimulatedHand::angles);
    if ctx.json {
        let joints_json = joints.map(|js| {
            js.iter()
                .map(|(j, a)| (j.name().to_string(), json!(a)))
                .collect::<serde_json::Map<_, _>>()
        });
        println!(
            "{}",
            json!({
                "transmitted": stats.transmitted,
                "coalesced": stats.coalesced,
                "dropped": stats.dropped_disconnected,
                "write_errors": stats.write_errors,
                "joints": joints_json,
            })
        );
        return;
    }
    println!(
        "sent {} frame(s) (coalesced {}, dropped {}, errors {})",
        stats.transmitted, stats.coalesced, stats.dropped_disconnected, stats.write_errors
    );
    if let Some(js) = joints {
        let line = js
            .iter()
            .map(|(j, a)| format!("{j}={a}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("joints: {line}");
    }
}
