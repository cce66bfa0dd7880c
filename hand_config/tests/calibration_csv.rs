use std::fs::File;
use std::io::Write;

use hand_config::{CalibrationRow, CalibrationTable, load_calibration_csv, save_calibration_csv};
use rstest::rstest;
use tempfile::tempdir;

fn row(finger: &str, open: f32, closed: f32) -> CalibrationRow {
    CalibrationRow {
        finger: finger.to_string(),
        open,
        closed,
    }
}

#[rstest]
fn rows_are_placed_in_finger_order() {
    let rows = vec![
        row("pinky", 0.5, 0.9),
        row("thumb", 0.1, 0.7),
        row("ring", 0.4, 0.8),
        row("Index", 0.2, 0.95),
        row("middle", 0.3, 0.85),
    ];
    let table = CalibrationTable::from_rows(rows).unwrap();
    assert_eq!(table.fingers[0], (0.1, 0.7));
    assert_eq!(table.fingers[1], (0.2, 0.95));
    assert_eq!(table.fingers[4], (0.5, 0.9));
}

#[rstest]
fn missing_finger_is_rejected() {
    let rows = vec![
        row("thumb", 0.1, 0.7),
        row("index", 0.2, 0.9),
        row("middle", 0.3, 0.9),
        row("ring", 0.4, 0.9),
    ];
    let err = CalibrationTable::from_rows(rows).expect_err("pinky missing");
    assert!(format!("{err}").contains("missing finger pinky"));
}

#[rstest]
fn duplicate_finger_is_rejected() {
    let rows = vec![row("thumb", 0.1, 0.7), row("thumb", 0.2, 0.8)];
    let err = CalibrationTable::from_rows(rows).expect_err("duplicate");
    assert!(format!("{err}").contains("more than once"));
}

#[rstest]
fn unknown_finger_is_rejected() {
    let err = CalibrationTable::from_rows(vec![row("wrist", 0.0, 1.0)]).expect_err("wrist");
    assert!(format!("{err}").contains("unknown finger"));
}

#[rstest]
fn equal_open_and_closed_is_accepted() {
    // Degenerate ranges are handled at normalization time, not rejected here.
    let rows = ["thumb", "index", "middle", "ring", "pinky"]
        .iter()
        .map(|f| row(f, 0.5, 0.5))
        .collect();
    assert!(CalibrationTable::from_rows(rows).is_ok());
}

#[rstest]
fn loads_csv_with_strict_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("calib.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "finger,open,closed").unwrap();
    writeln!(f, "thumb,0.10,0.70").unwrap();
    writeln!(f, "index,0.05,0.92").unwrap();
    writeln!(f, "middle,0.04,0.93").unwrap();
    writeln!(f, "ring,0.06,0.90").unwrap();
    writeln!(f, "pinky,0.08,0.88").unwrap();
    drop(f);

    let table = load_calibration_csv(&path).unwrap();
    assert!((table.fingers[2].1 - 0.93).abs() < 1e-6);
}

#[rstest]
#[case("name,open,closed")]
#[case("finger,closed,open")]
#[case("finger,open")]
fn rejects_wrong_headers(#[case] header: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("calib.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "{header}").unwrap();
    drop(f);

    let err = load_calibration_csv(&path).expect_err("bad headers");
    assert!(
        format!("{err}")
            .to_lowercase()
            .contains("calibration csv must have headers")
    );
}

#[rstest]
fn rejects_unparseable_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("calib.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "finger,open,closed").unwrap();
    writeln!(f, "thumb,abc,0.7").unwrap();
    drop(f);

    let err = load_calibration_csv(&path).expect_err("bad row");
    assert!(format!("{err}").contains("invalid CSV row 2"));
}

#[rstest]
fn saved_table_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");
    let table = CalibrationTable {
        fingers: [(0.1, 0.9), (0.15, 0.85), (0.2, 0.8), (0.25, 0.75), (0.3, 0.7)],
    };
    save_calibration_csv(&path, &table).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("finger,open,closed\nthumb,"));
    assert_eq!(load_calibration_csv(&path).unwrap(), table);
}
