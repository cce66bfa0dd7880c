use std::time::{Duration, Instant};

use hand_core::mocks::RecordingTransport;
use hand_core::{Dispatcher, DispatcherCfg, FingerAngles, Joint, WireCommand};

const INTERVAL: Duration = Duration::from_millis(500);

fn setup() -> (RecordingTransport, Dispatcher<RecordingTransport>) {
    let transport = RecordingTransport::connected();
    let d = Dispatcher::new(
        transport.clone(),
        DispatcherCfg {
            command_interval: INTERVAL,
        },
    );
    (transport, d)
}

#[test]
fn burst_sends_first_then_only_the_last() {
    let (transport, mut d) = setup();
    let t0 = Instant::now();
    d.set_joint(Joint::Wrist, 10, t0);
    d.set_joint(Joint::Wrist, 20, t0 + Duration::from_millis(100));
    d.set_joint(Joint::Wrist, 30, t0 + Duration::from_millis(200));
    assert_eq!(d.poll(t0 + Duration::from_millis(499)), 0);
    assert_eq!(d.poll(t0 + INTERVAL), 1);
    assert_eq!(transport.frames(), vec!["S-W:10".to_string(), "S-W:30".to_string()]);
    let stats = d.stats();
    assert_eq!(stats.submitted, 3);
    assert_eq!(stats.coalesced, 1);
    assert_eq!(stats.transmitted, 2);
}

#[test]
fn distinct_channels_both_go_out() {
    let (transport, mut d) = setup();
    let t0 = Instant::now();
    d.set_joint(Joint::Thumb, 0, t0);
    let t1 = t0 + Duration::from_millis(50);
    d.set_fingers(FingerAngles::new([0, 45, 90, 135, 150]), t1);
    d.set_joint(Joint::Wrist, 90, t1);
    assert_eq!(d.poll(t0 + INTERVAL), 2);
    assert_eq!(
        transport.frames(),
        vec![
            "S-T:0".to_string(),
            "P-T:0,I:45,M:90,R:135,P:150".to_string(),
            "S-W:90".to_string()
        ]
    );
}

#[test]
fn consecutive_flushes_are_an_interval_apart() {
    let (transport, mut d) = setup();
    let t0 = Instant::now();
    d.set_joint(Joint::Index, 1, t0);
    let t1 = t0 + Duration::from_millis(10);
    d.set_joint(Joint::Index, 2, t1);
    assert_eq!(d.next_deadline(), Some(t0 + INTERVAL));
    assert_eq!(d.poll(t0 + INTERVAL), 1);
    d.set_joint(Joint::Index, 3, t0 + INTERVAL + Duration::from_millis(10));
    assert_eq!(d.poll(t0 + INTERVAL * 2 - Duration::from_millis(1)), 0);
    assert_eq!(d.poll(t0 + INTERVAL * 2), 1);
    assert_eq!(
        transport.frames(),
        vec!["S-I:1".to_string(), "S-I:2".to_string(), "S-I:3".to_string()]
    );
}

#[test]
fn disconnected_submit_drops_only_that_write() {
    let (transport, mut d) = setup();
    let t0 = Instant::now();
    d.set_joint(Joint::Thumb, 0, t0);
    d.set_joint(Joint::Ring, 100, t0 + Duration::from_millis(10));
    transport.set_connected(false);
    d.set_joint(Joint::Pinky, 120, t0 + Duration::from_millis(20));
    assert_eq!(d.pending_len(), 1);
    assert_eq!(d.next_deadline(), Some(t0 + INTERVAL));
    transport.set_connected(true);
    assert_eq!(d.poll(t0 + INTERVAL), 1);
    assert_eq!(transport.frames(), vec!["S-T:0".to_string(), "S-R:100".to_string()]);
    assert_eq!(d.stats().dropped_disconnected, 1);
}

#[test]
fn write_failures_are_counted_not_propagated() {
    let (transport, mut d) = setup();
    transport.fail_writes(true);
    let t0 = Instant::now();
    d.submit(WireCommand::single(Joint::Thumb, 999), t0);
    assert_eq!(d.stats().write_errors, 1);
    transport.fail_writes(false);
    d.submit(WireCommand::single(Joint::Thumb, 999), t0 + INTERVAL);
    assert_eq!(transport.frames(), vec!["S-T:150".to_string()]);
}
