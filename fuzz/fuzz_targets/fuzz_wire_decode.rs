#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Whatever decodes must re-encode to a frame that decodes to the same command.
    if let Ok(cmd) = data.parse::<hand_core::WireCommand>() {
        let again = cmd.to_string().parse::<hand_core::WireCommand>();
        assert_eq!(again.ok(), Some(cmd));
    }
});
