// Workbook loading against generated .xlsx fixtures

mod common;

use chrono::NaiveDate;
use common::{write_workbook, Fixture};
use datalogger_normalizer::record::format_utc;
use datalogger_normalizer::table::Cell;
use datalogger_normalizer::{NormalizeError, Normalizer, WorkbookLoader};
use tempfile::TempDir;

fn logger_rows() -> Vec<Vec<Fixture<'static>>> {
    vec![
        vec![
            Fixture::Text("Data"),
            Fixture::Text("Hora"),
            Fixture::Text("Temperatura"),
            Fixture::Text("Umidade"),
        ],
        vec![
            Fixture::DateTime(45000.0),
            Fixture::Time(0.5),
            Fixture::Text("4,5"),
            Fixture::Number(61.0),
        ],
        vec![
            Fixture::DateTime(45000.0),
            Fixture::Time(0.75),
            Fixture::Number(4.75),
            Fixture::Blank,
        ],
    ]
}

#[test]
fn test_sheets_load_in_workbook_order() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[
            ("Resumo", vec![vec![Fixture::Text("Relatório")]]),
            ("Leituras", logger_rows()),
        ],
    );

    let sheets = WorkbookLoader::new(&path).load(None).unwrap();
    let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Resumo", "Leituras"]);

    let grid = &sheets[1].grid;
    assert_eq!(grid.height(), 3);
    assert_eq!(grid.rows[0][0], Cell::Text("Data".into()));
    assert_eq!(
        grid.rows[1][0],
        Cell::DateTime(
            NaiveDate::from_ymd_opt(2023, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        )
    );
    // time-only cells stay day fractions
    assert_eq!(grid.rows[1][1], Cell::Number(0.5));
    assert_eq!(grid.rows[1][2], Cell::Text("4,5".into()));
    assert_eq!(grid.rows[1][3], Cell::Number(61.0));
}

#[test]
fn test_named_sheet_only() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[
            ("Resumo", vec![vec![Fixture::Text("x")]]),
            ("Leituras", logger_rows()),
        ],
    );
    let sheets = WorkbookLoader::new(&path).load(Some("Leituras")).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "Leituras");
}

#[test]
fn test_unknown_sheet_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path(), "export.xlsx", &[("Leituras", logger_rows())]);
    let err = WorkbookLoader::new(&path).load(Some("Lista")).unwrap_err();
    assert!(matches!(err, NormalizeError::SheetNotFound(ref name) if name == "Lista"));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_xlsx_content_with_xls_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path(), "legacy.xls", &[("Leituras", logger_rows())]);
    let sheets = WorkbookLoader::new(&path).load(None).unwrap();
    assert_eq!(sheets[0].name, "Leituras");
}

#[test]
fn test_garbage_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"definitely not a spreadsheet").unwrap();
    let err = WorkbookLoader::new(&path).load(None).unwrap_err();
    assert!(matches!(err, NormalizeError::Read(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = WorkbookLoader::new(dir.path().join("nope.xlsx"))
        .load(None)
        .unwrap_err();
    assert!(matches!(err, NormalizeError::InputNotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_date_and_time_cells_normalize() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path(), "export.xlsx", &[("Leituras", logger_rows())]);
    let sheets = WorkbookLoader::new(&path).load(None).unwrap();
    let normalized = Normalizer::default().normalize(&sheets).unwrap();

    let lines: Vec<String> = normalized
        .records
        .iter()
        .map(|r| r.to_json_line().unwrap())
        .collect();
    assert_eq!(
        lines,
        vec![
            r#"{"timestamp":"2023-03-15T12:00:00Z","temperature":4.5,"humidity":61.0}"#,
            r#"{"timestamp":"2023-03-15T18:00:00Z","temperature":4.75,"humidity":null}"#,
        ]
    );
    assert_eq!(
        normalized.records[0].timestamp.as_ref().map(format_utc).as_deref(),
        Some("2023-03-15T12:00:00Z")
    );
}
