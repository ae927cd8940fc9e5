use super::layout::LogLayout;
use super::reader::read_baseline_log;
use super::writer::BaselineLogWriter;
use super::DatasetError;
use crate::logic::telemetry::TelemetrySample;
use chrono::Utc;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

fn layout() -> LogLayout {
    LogLayout::new(
        vec!["temperature_C".into(), "pH".into(), "rpm".into()],
        vec!["heater_pwm".into(), "motor_pwm".into()],
    )
}

#[test]
fn test_baseline_append_and_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("baseline.csv");

    let mut writer = BaselineLogWriter::open(&path, layout()).unwrap();
    writer
        .append(
            &TelemetrySample::new(Utc::now())
                .with_signal("temperature_C", 30.2, 30.0)
                .with_signal("pH", 4.9, 5.0)
                .with_signal("rpm", 1003.0, 1000.0)
                .with_actuator("heater_pwm", 0.42),
        )
        .unwrap();
    writer
        .append(&TelemetrySample::new(Utc::now()).with_signal("temperature_C", 29.9, 30.0))
        .unwrap();
    assert_eq!(writer.rows_written(), 2);
    drop(writer);

    let log = read_baseline_log(&path).unwrap();

    assert_eq!(log.layout, layout());
    assert_eq!(log.samples.len(), 2);
    assert_eq!(log.bad_cells, 0);

    let first = &log.samples[0];
    assert!((first.control_error("temperature_C").unwrap() - 0.2).abs() < 1e-9);
    assert!((first.control_error("rpm").unwrap() - 3.0).abs() < 1e-9);
    assert_eq!(first.actuator("heater_pwm"), Some(0.42));
    assert_eq!(first.actuator("motor_pwm"), None);

    let second = &log.samples[1];
    assert!(second.signal("pH").is_none());
    assert!(second.signal("temperature_C").is_some());
}

#[test]
fn test_reopen_appends_without_second_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("baseline.csv");
    let sample = TelemetrySample::new(Utc::now()).with_signal("pH", 5.0, 5.0);

    BaselineLogWriter::open(&path, layout()).unwrap().append(&sample).unwrap();
    BaselineLogWriter::open(&path, layout()).unwrap().append(&sample).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert_eq!(content.lines().filter(|l| l.starts_with("time,")).count(), 1);
}

#[test]
fn test_reopen_with_different_layout_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("baseline.csv");
    BaselineLogWriter::open(&path, layout()).unwrap();

    let other = LogLayout::new(vec!["pH".into()], vec![]);
    match BaselineLogWriter::open(&path, other) {
        Err(DatasetError::HeaderMismatch { .. }) => {}
        Err(e) => panic!("Expected HeaderMismatch, got {}", e),
        Ok(_) => panic!("Expected HeaderMismatch"),
    }
}

#[test]
fn test_read_tolerates_bad_cells() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("baseline.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "time,pH,pH_setpoint,pH_error").unwrap();
    writeln!(file, "2025-11-12T10:00:00+00:00,5.1,5.0,0.1").unwrap();
    writeln!(file, "2025-11-12T10:00:01+00:00,oops,5.0,").unwrap();
    writeln!(file, "not-a-time,4.9,5.0,-0.1").unwrap();
    drop(file);

    let log = read_baseline_log(&path).unwrap();

    assert_eq!(log.samples.len(), 3);
    assert_eq!(log.bad_cells, 1);
    assert!(log.samples[1].signal("pH").is_none());
    assert!(log.samples[2].signal("pH").is_some());
}

#[test]
fn test_missing_log_is_not_found() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        read_baseline_log(&dir.path().join("nope.csv")),
        Err(DatasetError::NotFound(_))
    ));
}
