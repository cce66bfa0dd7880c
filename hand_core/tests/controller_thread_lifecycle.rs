//! Controller thread lifecycle: inputs flow through, drop joins the thread.

use std::time::{Duration, Instant};

use hand_core::mocks::RecordingTransport;
use hand_core::{
    CommandKind, ControlInput, ControllerBuilder, DispatcherCfg, Joint, PlaybackCfg,
    PlaybackState, Program, TargetPositions, TraversalMode,
};

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

fn fast_builder(transport: RecordingTransport) -> ControllerBuilder<RecordingTransport, hand_traits::MonotonicClock> {
    ControllerBuilder::new()
        .with_transport(transport)
        .dispatcher(DispatcherCfg {
            command_interval: Duration::from_millis(10),
        })
        .playback(PlaybackCfg {
            settle_delay: Duration::from_millis(10),
        })
}

#[test]
fn manual_input_reaches_transport() {
    let transport = RecordingTransport::connected();
    let handle = fast_builder(transport.clone()).build().unwrap().spawn(8);
    handle.send(ControlInput::Manual(Joint::Middle, 45)).unwrap();
    assert!(wait_until(Duration::from_secs(2), || !transport.frames().is_empty()));
    assert_eq!(transport.frames(), vec!["S-M:45".to_string()]);
    drop(handle);
}

#[test]
fn join_returns_controller_with_state() {
    let transport = RecordingTransport::connected();
    let mut program = Program::new("loop");
    program.add_command(CommandKind::Move(TargetPositions::default()));
    program.add_command(CommandKind::wait_secs(0.01));
    let handle = fast_builder(transport.clone())
        .program(program)
        .build()
        .unwrap()
        .spawn(8);
    handle.send(ControlInput::Play(TraversalMode::Loop)).unwrap();
    assert!(wait_until(Duration::from_secs(2), || handle.status().steps_executed >= 4));
    let ctrl = handle.join().unwrap();
    assert_eq!(ctrl.editor().state(), PlaybackState::Idle);
    assert!(transport.frames().iter().any(|f| f == "S-W:90"));
}

#[test]
fn repeated_spawn_and_drop_does_not_hang() {
    for _ in 0..10 {
        let handle = fast_builder(RecordingTransport::connected())
            .build()
            .unwrap()
            .spawn(4);
        let _ = handle.send(ControlInput::Stop);
        drop(handle);
    }
}

#[test]
fn status_is_published_before_any_input() {
    let handle = fast_builder(RecordingTransport::connected())
        .build()
        .unwrap()
        .spawn(1);
    let status = handle.status();
    assert_eq!(status.playback, PlaybackState::Idle);
    let _ctrl = handle.join().unwrap();
}
