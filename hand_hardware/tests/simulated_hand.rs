use std::time::{Duration, Instant};

use hand_core::{
    CommandKind, Dispatcher, DispatcherCfg, Joint, PlaybackCfg, PlaybackEngine, Program,
    TargetPositions, TraversalMode,
};
use hand_hardware::SimulatedHand;
use rstest::rstest;

fn dispatcher(hand: &SimulatedHand) -> Dispatcher<SimulatedHand> {
    Dispatcher::new(
        hand.clone(),
        DispatcherCfg {
            command_interval: Duration::from_millis(100),
        },
    )
}

#[rstest]
#[case::clamped_high(b"S-T:999".as_slice(), Joint::Thumb, 150)]
#[case::wrist(b"S-W:45".as_slice(), Joint::Wrist, 45)]
#[case::leading_zeros(b"S-M:007".as_slice(), Joint::Middle, 7)]
fn single_frames_set_one_joint(#[case] frame: &[u8], #[case] joint: Joint, #[case] expected: u16) {
    use hand_traits::Transport;
    let mut hand = SimulatedHand::new();
    hand.write(frame).unwrap();
    assert_eq!(hand.angle(joint), expected);
}

#[test]
fn playback_drives_simulated_joints() {
    let hand = SimulatedHand::new();
    let mut d = dispatcher(&hand);
    let mut p = Program::new("grip");
    p.add_command(CommandKind::Move(TargetPositions::new(150, 180, 180, 180, 150, 30)));
    let mut e = PlaybackEngine::new(PlaybackCfg::default());
    let t0 = Instant::now();
    e.start(&p, TraversalMode::Once, t0, &mut d);
    d.poll(t0 + Duration::from_millis(100));
    let angles = hand.angles();
    assert_eq!(
        angles,
        [
            (Joint::Thumb, 150),
            (Joint::Index, 180),
            (Joint::Middle, 180),
            (Joint::Ring, 180),
            (Joint::Pinky, 150),
            (Joint::Wrist, 30),
        ]
    );
}

#[test]
fn disconnected_hand_receives_nothing() {
    let hand = SimulatedHand::new();
    let mut d = dispatcher(&hand);
    hand.set_connected(false);
    let t0 = Instant::now();
    d.set_joint(Joint::Index, 90, t0);
    d.poll(t0 + Duration::from_secs(1));
    assert!(hand.frames().is_empty());
    assert_eq!(hand.angle(Joint::Index), 0);
}
