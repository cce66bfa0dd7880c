#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(file) = hand_config::load_program_toml(data) else {
        return;
    };
    if file.validate().is_err() {
        return;
    }
    // Every accepted program must convert with all targets in range.
    let program = hand_core::Program::from(&file);
    assert_eq!(program.len(), file.commands.len());
    for cmd in program.iter() {
        if let hand_core::CommandKind::Move(t) = cmd.kind() {
            for j in hand_core::Joint::ALL {
                let (min, max) = j.range();
                assert!((min..=max).contains(&t.get(j)));
            }
        }
    }
});
