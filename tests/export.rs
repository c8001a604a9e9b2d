use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use scoreai_terminal::export::{
    HEADERS, csv_string, default_export_path, export_rows, write_csv, write_xlsx,
};
use scoreai_terminal::model::ProviderRecord;
use scoreai_terminal::pipeline::{Batch, process_records};
use scoreai_terminal::provider::parse_records_json;

fn fixture_batch() -> Batch {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("provider_batch.json");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    process_records(parse_records_json(&raw).expect("batch parses"), 1)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scoreai-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn csv_has_header_and_one_line_per_prediction() {
    let rows = export_rows(&fixture_batch());
    let csv = csv_string(&rows);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], HEADERS.join(","));
    assert!(lines[1].starts_with(
        "\"2026-10-18\",\"Premier League\",\"Arsenal\",\"Chelsea\",\"Home (Arsenal)\",2.1,82%,55.0%,47.6%,15.5%,"
    ));
    assert!(lines[2].contains(",\"Draw\",3.6,71%,30.0%,27.8%,8.0%,"));
}

#[test]
fn csv_escapes_quotes_and_keeps_commas_inside_fields() {
    let rows = export_rows(&fixture_batch());
    let csv = csv_string(&rows);
    assert!(csv.contains(r#""Clasico, both sides cautious after midweek ""Champions League"" games.""#));
}

#[test]
fn export_skips_results_without_fixture() {
    let mut batch = fixture_batch();
    batch.fixtures.remove(0);
    assert_eq!(export_rows(&batch).len(), 3);

    let dir = scratch_dir("skip");
    let report = write_csv(&dir.join("out.csv"), &batch).expect("csv written");
    assert_eq!(report.rows, 3);
    assert_eq!(report.skipped, 1);
}

#[test]
fn writes_csv_and_xlsx_files() {
    let batch = fixture_batch();
    let dir = scratch_dir("files");

    let csv = write_csv(&dir.join("p.csv"), &batch).expect("csv written");
    assert_eq!(csv.rows, 4);
    let text = fs::read_to_string(&csv.path).expect("csv readable");
    assert!(text.starts_with("Date,League,"));

    let xlsx = write_xlsx(&dir.join("p.xlsx"), &batch).expect("xlsx written");
    assert_eq!(xlsx.rows, 4);
    let meta = fs::metadata(&xlsx.path).expect("xlsx exists");
    assert!(meta.len() > 0);
}

#[test]
fn default_path_uses_dated_name() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
    let path = default_export_path(Path::new("out"), date, "csv");
    assert_eq!(path, Path::new("out").join("ScoreAI_Predictions_2026-10-18.csv"));
}

#[test]
fn free_text_dates_stay_in_one_column() {
    let record = ProviderRecord {
        home_team: "H".to_string(),
        away_team: "A".to_string(),
        league: "L".to_string(),
        match_date: "Sun, Oct 18 2026 15:00".to_string(),
        odds_home: 2.0,
        odds_draw: 3.5,
        odds_away: 4.0,
        home_win_prob: 0.55,
        draw_prob: 0.25,
        away_win_prob: 0.20,
        reasoning: "r".to_string(),
        confidence_score: 0.7,
    };
    let batch = process_records(vec![record], 1);
    let csv = csv_string(&export_rows(&batch));
    let row = csv.lines().nth(1).expect("data row");
    assert!(row.starts_with("\"Sun, Oct 18 2026 15:00\",\"L\",\"H\",\"A\",\"Home (H)\",2,70%,"));
}
