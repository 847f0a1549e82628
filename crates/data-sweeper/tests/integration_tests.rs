//! Integration tests for the upload, clean, history and export workflow.
//!
//! These tests drive the public API end to end using the files under
//! `tests/fixtures`.

use data_sweeper::{
    BarChart, CleaningOperation, ExportFormat, Exporter, FileIngestor, FillStrategy,
    ReportGenerator, ReportSummary, ScalarType, Session, Shell, SweeperConfig, SweeperError,
    TabularData, Upload,
};
use data_sweeper::utils::format_kb;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> Upload {
    Upload::from_path(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn session_with(filename: &str) -> Session {
    let mut session = Session::new();
    session
        .ingest(&load_fixture(filename), &FileIngestor::default())
        .expect("Failed to ingest fixture");
    session
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("data-sweeper-{}-{}", name, std::process::id()))
}

// ============================================================================
// Ingestion Tests
// ============================================================================

#[test]
fn test_ingest_sales_fixture() {
    let mut session = Session::new();
    let upload = load_fixture("sales.csv");

    let outcome = session.ingest(&upload, &FileIngestor::default()).unwrap();

    assert_eq!(outcome.metadata.name, "sales.csv");
    assert_eq!(outcome.metadata.row_count, 3);
    assert_eq!(outcome.metadata.column_count, 2);
    assert_eq!(outcome.data.column_names(), vec!["product", "qty"]);
    assert_eq!(outcome.data.column_type("qty").unwrap(), ScalarType::Number);
    assert_eq!(outcome.data.column_type("product").unwrap(), ScalarType::Text);
}

#[test]
fn test_ingest_infers_dates() {
    let session = session_with("dates.csv");
    let data = session.current("dates.csv").unwrap();

    assert_eq!(data.column_type("day").unwrap(), ScalarType::Date);
    assert_eq!(data.column_type("amount").unwrap(), ScalarType::Number);
}

#[test]
fn test_unsupported_upload_is_not_recorded() {
    let mut session = Session::new();
    let err = session
        .ingest(&load_fixture("notes.txt"), &FileIngestor::default())
        .unwrap_err();

    assert!(matches!(err, SweeperError::UnsupportedFormat(_)));
    assert_eq!(err.to_string(), "Unsupported file type: .txt");
    assert!(session.history().is_empty());
    assert!(session.current("notes.txt").is_none());
}

#[test]
fn test_upload_history_records_csv_and_xlsx() {
    let mut session = Session::new();
    let ingestor = FileIngestor::default();

    // "v\n" plus 1023 rows of "1\n" is exactly 2048 bytes
    let csv = Upload::new("report.csv", format!("v\n{}", "1\n".repeat(1023)));
    assert_eq!(csv.size(), 2048);
    let table = session.ingest(&csv, &ingestor).unwrap().data;

    let xlsx = Upload::new("report.xlsx", Exporter::to_xlsx(&table).unwrap());
    let outcome = session.ingest(&xlsx, &ingestor).unwrap();
    assert_eq!(outcome.data, table);

    let records: Vec<(&str, &str)> = session
        .history()
        .iter()
        .map(|r| (r.file_name.as_str(), r.size_kb.as_str()))
        .collect();
    let xlsx_size = format_kb(xlsx.size());
    assert_eq!(
        records,
        vec![("report.csv", "2.00 KB"), ("report.xlsx", xlsx_size.as_str())]
    );
    assert_eq!(session.file_names(), vec!["report.csv", "report.xlsx"]);
}

#[test]
fn test_ingest_all_skips_corrupt_workbook() {
    let mut session = Session::new();
    let uploads = vec![
        Upload::new("broken.xlsx", "this is not a zip archive"),
        load_fixture("notes.txt"),
        load_fixture("sales.csv"),
    ];

    let results = session.ingest_all(&uploads, &FileIngestor::default());

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().unwrap_err().error_code(),
        "SPREADSHEET_READ_ERROR"
    );
    assert!(results[1].as_ref().unwrap_err().is_unsupported_format());
    assert_eq!(results[2].as_ref().unwrap().metadata.row_count, 3);

    let names: Vec<&str> = session.history().iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["sales.csv"]);
    assert!(session.current("broken.xlsx").is_none());
}

#[test]
fn test_reupload_keeps_single_record() {
    let mut session = session_with("sales.csv");
    session
        .ingest(&load_fixture("sales.csv"), &FileIngestor::default())
        .unwrap();

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.depth("sales.csv"), 2);
}

// ============================================================================
// Cleaning Tests
// ============================================================================

#[test]
fn test_sales_dedupe_undo_redo() {
    let mut session = session_with("sales.csv");

    let outcome = session
        .apply("sales.csv", &CleaningOperation::RemoveDuplicates)
        .unwrap();
    assert_eq!(outcome.data.height(), 2);
    assert_eq!(outcome.steps, vec!["Removed 1 duplicate rows"]);

    let undone = session.undo("sales.csv").unwrap();
    assert_eq!(undone.height(), 3);

    let redone = session.redo("sales.csv").unwrap();
    assert_eq!(redone, outcome.data);
}

#[test]
fn test_dedupe_is_idempotent() {
    let mut session = session_with("dates.csv");

    let once = session
        .apply("dates.csv", &CleaningOperation::RemoveDuplicates)
        .unwrap();
    let twice = session
        .apply("dates.csv", &CleaningOperation::RemoveDuplicates)
        .unwrap();

    assert_eq!(once.data.height(), 2);
    assert_eq!(twice.data, once.data);
    assert_eq!(twice.steps, vec!["No duplicate rows found"]);
}

#[test]
fn test_fill_mean_on_fixture() {
    let mut session = session_with("missing.csv");

    let outcome = session
        .apply("missing.csv", &CleaningOperation::FillMissing(FillStrategy::Mean))
        .unwrap();

    let score: Vec<Option<f64>> = outcome
        .data
        .frame()
        .column("score")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(score, vec![Some(10.0), Some(20.0), Some(30.0), Some(20.0)]);
    assert_eq!(outcome.steps, vec!["Filled 'score' with mean: 20.00"]);

    // text column untouched
    let names = outcome.data.frame().column("name").unwrap().null_count();
    assert_eq!(names, 0);
}

#[test]
fn test_fill_mean_small_column() {
    let data = TabularData::new(df!["x" => [Some(1.0), None, Some(3.0)]].unwrap()).unwrap();
    let mut session = Session::new();
    session.save_history("x.csv", data);

    let outcome = session
        .apply("x.csv", &CleaningOperation::FillMissing(FillStrategy::Mean))
        .unwrap();

    let expected = TabularData::new(df!["x" => [1.0, 2.0, 3.0]].unwrap()).unwrap();
    assert_eq!(outcome.data, expected);
}

#[test]
fn test_fill_without_nulls_is_noop() {
    let mut session = session_with("sales.csv");
    let before = session.current("sales.csv").cloned().unwrap();

    let outcome = session
        .apply("sales.csv", &CleaningOperation::FillMissing(FillStrategy::Median))
        .unwrap();

    assert_eq!(outcome.data, before);
    assert!(outcome.steps.is_empty());
}

#[test]
fn test_fill_mode_picks_smallest_on_tie() {
    let data = TabularData::new(
        df!["v" => [Some(2.0), Some(1.0), Some(2.0), Some(1.0), None]].unwrap(),
    )
    .unwrap();
    let mut session = Session::new();
    session.save_history("v.csv", data);

    let outcome = session
        .apply("v.csv", &CleaningOperation::FillMissing(FillStrategy::Mode))
        .unwrap();

    let last = outcome
        .data
        .frame()
        .column("v")
        .unwrap()
        .f64()
        .unwrap()
        .get(4);
    assert_eq!(last, Some(1.0));
}

// ============================================================================
// History Tests
// ============================================================================

#[test]
fn test_undo_after_single_save_returns_none() {
    let mut session = session_with("sales.csv");
    assert!(session.undo("sales.csv").is_none());
    assert!(session.redo("sales.csv").is_none());
}

#[test]
fn test_apply_after_undo_clears_redo() {
    let mut session = session_with("missing.csv");
    session
        .apply("missing.csv", &CleaningOperation::RemoveDuplicates)
        .unwrap();
    session.undo("missing.csv").unwrap();

    session
        .apply("missing.csv", &CleaningOperation::FillMissing(FillStrategy::Mode))
        .unwrap();

    assert!(session.redo("missing.csv").is_none());
    assert_eq!(session.depth("missing.csv"), 2);
}

// ============================================================================
// Export, Chart and Report Tests
// ============================================================================

#[test]
fn test_export_names_and_mime_types() {
    let session = session_with("sales.csv");
    let data = session.current("sales.csv").unwrap();

    let csv = Exporter::export(data, "sales.csv", ExportFormat::Csv).unwrap();
    assert_eq!(csv.file_name, "sales.csv");
    assert_eq!(csv.mime_type, "text/csv");
    assert_eq!(
        String::from_utf8(csv.bytes).unwrap(),
        "product,qty\nA,1\nA,1\nB,2\n"
    );

    let xlsx = Exporter::export(data, "sales.csv", ExportFormat::Excel).unwrap();
    assert_eq!(xlsx.file_name, "sales.xlsx");
    assert_eq!(
        xlsx.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(&xlsx.bytes[..2], b"PK");
}

#[test]
fn test_xlsx_round_trip_preserves_table() {
    let session = session_with("sales.csv");
    let data = session.current("sales.csv").unwrap();

    let artifact = Exporter::export(data, "sales.csv", ExportFormat::Excel).unwrap();
    let reread = FileIngestor::default()
        .read(&Upload::new(artifact.file_name, artifact.bytes))
        .unwrap();

    assert_eq!(&reread, data);
}

#[test]
fn test_report_is_pdf() {
    let upload = load_fixture("sales.csv");
    let session = session_with("sales.csv");
    let data = session.current("sales.csv").unwrap();

    let summary = ReportSummary::new(&upload.name, upload.size(), data);
    let artifact = ReportGenerator::default().artifact(&summary).unwrap();

    assert_eq!(artifact.file_name, "sales.csv_report.pdf");
    assert_eq!(artifact.mime_type, "application/pdf");
    assert!(artifact.bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_chart_svg_has_one_bar_per_row() {
    let session = session_with("missing.csv");
    let data = session.current("missing.csv").unwrap();

    let chart = BarChart::from_column(data, "score").unwrap();
    assert_eq!(chart.points, vec![(0, 10.0), (2, 30.0)]);

    let svg = chart.render_svg(&SweeperConfig::default()).unwrap();
    assert_eq!(svg.to_ascii_lowercase().matches("#1f77b4").count(), 2);

    let err = BarChart::from_column(data, "name").unwrap_err();
    assert!(matches!(err, SweeperError::NotNumeric { .. }));
}

#[test]
fn test_artifact_write_to_creates_dir() {
    let dir = scratch_dir("export");
    let session = session_with("sales.csv");
    let data = session.current("sales.csv").unwrap();

    let artifact = Exporter::export(data, "sales.csv", ExportFormat::Csv).unwrap();
    let path = artifact.write_to(&dir).unwrap();

    assert_eq!(path, dir.join("sales.csv"));
    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Shell and Config Tests
// ============================================================================

#[test]
fn test_shell_script() {
    let mut shell = Shell::new(SweeperConfig::default());
    shell.load(&load_fixture("sales.csv")).unwrap();
    shell.load(&load_fixture("notes.txt")).unwrap();

    let script = "dedupe sales.csv\nundo sales.csv\nredo sales.csv\nhistory\nquit\n";
    let mut output = Vec::new();
    shell.run(script.as_bytes(), &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Removed 1 duplicate rows"));
    assert!(text.contains("Undo successful for sales.csv!"));
    assert!(text.contains("Redo successful for sales.csv!"));
    assert!(text.contains("sales.csv | "));
    assert!(!text.contains("notes.txt |"));
    assert_eq!(shell.session().current("sales.csv").unwrap().height(), 2);
}

#[test]
fn test_config_from_json_file() {
    let dir = scratch_dir("config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sweeper.json");
    std::fs::write(&path, r#"{"preview_rows": 3, "default_fill_strategy": "Median"}"#).unwrap();

    let config = SweeperConfig::from_json_file(&path).unwrap();

    assert_eq!(config.preview_rows, 3);
    assert_eq!(config.default_fill_strategy, FillStrategy::Median);
    assert_eq!(config.chart_width, SweeperConfig::default().chart_width);
    std::fs::remove_dir_all(&dir).ok();
}
