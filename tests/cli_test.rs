// Process-level behavior of the normalizer binary: stdout lines and exit codes

mod common;

use common::{write_workbook, Fixture};
use std::process::Command;
use tempfile::TempDir;

fn normalizer() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_datalogger-normalizer"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_emits_json_lines() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[(
            "Plan1",
            vec![
                vec![Fixture::Text("Data/Hora"), Fixture::Text("Temperatura")],
                vec![Fixture::Text("05/01/2024 10:00"), Fixture::Text("4,5")],
                vec![Fixture::Text("31/01/2024 10:05"), Fixture::Blank],
            ],
        )],
    );

    let output = normalizer().arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"timestamp":"2024-01-05T10:00:00Z","temperature":4.5,"humidity":null}"#,
            r#"{"timestamp":"2024-01-31T10:05:00Z","temperature":null,"humidity":null}"#,
        ]
    );
}

#[test]
fn test_missing_file_exit_code() {
    let output = normalizer().arg("/nonexistent/export.xls").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["error"], "File not found: /nonexistent/export.xls");
}

#[test]
fn test_no_usable_sheet_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[(
            "Plan1",
            vec![
                vec![Fixture::Text("Sensor"), Fixture::Text("Temperatura")],
                vec![Fixture::Text("A"), Fixture::Number(4.5)],
            ],
        )],
    );
    let output = normalizer().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(r#"{"error":"No usable sheet found"#));
}

#[test]
fn test_unknown_sheet_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[("Plan1", vec![vec![Fixture::Text("Data")]])],
    );
    let output = normalizer().arg(&path).arg("Lista").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_gap_report_flag() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[(
            "Plan1",
            vec![
                vec![Fixture::Text("Data/Hora"), Fixture::Text("Temperatura")],
                vec![Fixture::Text("2024-01-05 10:00:00"), Fixture::Number(4.5)],
                vec![Fixture::Text("??"), Fixture::Number(4.6)],
            ],
        )],
    );
    let output = normalizer().arg(&path).arg("--gaps").output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["gap_rows"], 1);
    assert_eq!(report["samples"][0]["row"], 1);
    assert_eq!(report["samples"][0]["temperature"], 4.6);
}
