use hand_core::calibration::{FingerCalibration, joint_angle, normalize};
use hand_core::protocol::WireCommand;
use hand_core::smoothing::{SmoothingState, smooth};
use hand_core::Joint;
use proptest::prelude::*;

fn any_f32() -> impl Strategy<Value = f32> {
    prop_oneof![
        any::<f32>(),
        -10.0f32..10.0,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
    ]
}

fn any_joint() -> impl Strategy<Value = Joint> {
    prop::sample::select(Joint::ALL.to_vec())
}

proptest! {
    #[test]
    fn normalized_curl_is_unit_interval(raw in any_f32(), open in any_f32(), closed in any_f32()) {
        let n = normalize(raw, &FingerCalibration { open, closed });
        prop_assert!((0.0..=1.0).contains(&n), "normalize produced {n}");
    }

    #[test]
    fn joint_angle_stays_in_range(joint in any_joint(), curl in any_f32()) {
        let (min, max) = joint.range();
        let a = joint_angle(joint, curl);
        prop_assert!(a >= min && a <= max);
    }

    #[test]
    fn clamp_never_leaves_range(joint in any_joint(), v in any::<i64>()) {
        let (min, max) = joint.range();
        let c = joint.clamp(v);
        prop_assert!(c >= min && c <= max);
    }

    #[test]
    fn first_smoothed_sample_is_raw(raw in 0.0f32..=1.0, alpha in 0.01f32..=1.0) {
        let (out, state) = smooth(raw, SmoothingState::default(), alpha);
        prop_assert_eq!(out, raw);
        prop_assert!(state.is_initialized());
    }

    #[test]
    fn smoothing_converges_to_constant_input(target in 0.0f32..=1.0, alpha in 0.1f32..=1.0) {
        let (_, mut state) = smooth(1.0 - target, SmoothingState::default(), alpha);
        for _ in 0..200 {
            state = smooth(target, state, alpha).1;
        }
        prop_assert!((state.curl() - target).abs() < 1e-3);
    }

    #[test]
    fn decoder_never_panics(s in ".{0,40}") {
        let _ = s.parse::<WireCommand>();
    }

    #[test]
    fn decoded_singles_are_in_range(joint in any_joint(), v in any::<i64>()) {
        let frame = format!("S-{}:{v}", joint.wire_code());
        if let Ok(WireCommand::Single(j, a)) = frame.parse::<WireCommand>() {
            let (min, max) = j.range();
            prop_assert_eq!(j, joint);
            prop_assert!(a >= min && a <= max);
        }
    }
}
