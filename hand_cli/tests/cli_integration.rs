use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Short intervals keep the simulated runs fast
fn write_fast_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[dispatcher]
command_interval_ms = 20

[playback]
settle_delay_ms = 20

[smoothing]
alpha = 1.0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_program(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("prog.toml");
    fs::write(&path, body).unwrap();
    path
}

const GRIP: &str = r#"
name = "grip"
[[commands]]
type = "move"
thumb = 150
index = 180
middle = 180
ring = 180
pinky = 150
wrist = 45
[[commands]]
type = "wait"
seconds = 0.02
"#;

fn handctl(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("handctl").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["encode", "--joint", "thumb", "--angle", "999"], 0, "S-T:150", "stdout")]
#[case(&["encode", "--joint", "W", "--angle", "-4"], 0, "S-W:0", "stdout")]
#[case(&["encode", "--fingers", "0,45,90,135,200"], 0, "P-T:0,I:45,M:90,R:135,P:150", "stdout")]
#[case(&["encode", "--fingers", "1,2,3"], 1, "exactly 5 values", "stderr")]
#[case(&["encode", "--joint", "elbow", "--angle", "3"], 2, "unknown joint", "stderr")]
#[case(&["send"], 2, "required", "stderr")]
#[case(&["send", "--joint", "index", "--angle", "90"], 0, "index=90", "stdout")]
#[case(&["self-check"], 0, "transport: simulated", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let mut cmd = handctl(&cfg);
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);
    let pred = predicate::str::contains(needle);
    match stream {
        "stdout" => {
            assert.stdout(pred);
        }
        _ => {
            assert.stderr(pred);
        }
    }
}

#[test]
fn play_once_moves_simulated_hand() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let prog = write_program(&dir, GRIP);
    handctl(&cfg)
        .args(["play", "--program"])
        .arg(&prog)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "joints: thumb=150 index=180 middle=180 ring=180 pinky=150 wrist=45",
        ));
}

#[test]
fn play_loop_stops_after_duration_with_json_report() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let prog = write_program(&dir, GRIP);
    let out = handctl(&cfg)
        .args(["--json", "play", "--mode", "loop", "--duration-ms", "150", "--program"])
        .arg(&prog)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let line = stdout.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert!(v["transmitted"].as_u64().unwrap() >= 2);
    assert_eq!(v["joints"]["wrist"], 45);
}

#[test]
fn empty_program_fails_with_typed_exit_code() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let prog = write_program(&dir, "name = \"nothing\"\n");
    handctl(&cfg)
        .args(["play", "--program"])
        .arg(&prog)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("no commands"));
}

#[test]
fn invalid_config_is_humanized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[smoothing]\nalpha = 0.0\n").unwrap();
    handctl(&path)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"));
}

#[test]
fn missing_link_device_exits_with_link_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("link.toml");
    let dev = dir.path().join("rfcomm-missing");
    fs::write(&path, format!("[link]\ndevice = {:?}\n", dev.display().to_string())).unwrap();
    handctl(&path)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("rfcomm"));
}

#[test]
fn link_device_receives_frames() {
    let dir = tempdir().unwrap();
    let dev = dir.path().join("rfcomm0");
    fs::write(&dev, b"").unwrap();
    let path = dir.path().join("link.toml");
    fs::write(
        &path,
        format!(
            "[dispatcher]\ncommand_interval_ms = 20\n[link]\ndevice = {:?}\n",
            dev.display().to_string()
        ),
    )
    .unwrap();
    handctl(&path)
        .args(["send", "--joint", "ring", "--angle", "77"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sent 1 frame(s)"));
    assert_eq!(fs::read_to_string(&dev).unwrap(), "S-R:77");
}

#[test]
fn pose_replay_applies_calibration() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let frames = dir.path().join("frames.csv");
    fs::write(
        &frames,
        "thumb,index,middle,ring,pinky\n0.2,0.2,0.2,0.2,0.2\n,,,,\n0.6,0.6,0.6,0.6,0.6\n",
    )
    .unwrap();
    let cal = dir.path().join("cal.csv");
    fs::write(
        &cal,
        "finger,open,closed\nthumb,0.2,0.6\nindex,0.2,0.6\nmiddle,0.2,0.6\nring,0.2,0.6\npinky,0.2,0.6\n",
    )
    .unwrap();
    handctl(&cfg)
        .arg("--calibration")
        .arg(&cal)
        .args(["pose", "--fps", "20", "--frames"])
        .arg(&frames)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "joints: thumb=150 index=180 middle=180 ring=180 pinky=150 wrist=90",
        ));
}

#[test]
fn bad_calibration_header_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let cal = dir.path().join("cal.csv");
    fs::write(&cal, "raw,grams\n1,2\n").unwrap();
    handctl(&cfg)
        .arg("--calibration")
        .arg(&cal)
        .arg("self-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected 'finger,open,closed'"));
}

#[test]
fn calibrate_writes_loadable_csv() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let frames = dir.path().join("captures.csv");
    fs::write(
        &frames,
        "thumb,index,middle,ring,pinky\n\
         0.1,0.1,0.1,0.1,0.1\n\
         ,,,,\n\
         0.9,0.9,0.9,0.9,0.9\n\
         0.05,0.9,0.9,0.9,0.9\n\
         0.9,0.1,0.9,0.9,0.9\n\
         0.9,0.9,0.1,0.9,0.9\n\
         0.9,0.9,0.9,0.1,0.9\n\
         0.9,0.9,0.9,0.9,0.1\n",
    )
    .unwrap();
    let out = dir.path().join("cal.csv");
    handctl(&cfg)
        .args(["calibrate", "--frames"])
        .arg(&frames)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("step 7/7"));
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("finger,open,closed\nthumb,0.05,0.9\n"));

    // The written file is accepted by --calibration
    handctl(&cfg)
        .arg("--calibration")
        .arg(&out)
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("calibration: loaded"));
}

#[test]
fn calibrate_with_too_few_frames_fails() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let frames = dir.path().join("captures.csv");
    fs::write(&frames, "thumb,index,middle,ring,pinky\n0.1,0.1,0.1,0.1,0.1\n").unwrap();
    handctl(&cfg)
        .args(["calibrate", "--frames"])
        .arg(&frames)
        .arg("--out")
        .arg(dir.path().join("cal.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("captured 1 of 7"));
}
