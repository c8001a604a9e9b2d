use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use scoreai_terminal::export;
use scoreai_terminal::pipeline;
use scoreai_terminal::provider::parse_records_json;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let mut input: Option<PathBuf> = None;
    let mut csv_out: Option<PathBuf> = None;
    let mut xlsx_out: Option<PathBuf> = None;
    let mut stamp: Option<i64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--csv" => csv_out = args.next().map(PathBuf::from),
            "--xlsx" => xlsx_out = args.next().map(PathBuf::from),
            "--stamp" => stamp = args.next().and_then(|v| v.parse().ok()),
            _ => input = Some(PathBuf::from(arg)),
        }
    }

    let path = input.unwrap_or_else(|| PathBuf::from("tests/fixtures/provider_batch.json"));
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let records = parse_records_json(&raw)?;
    let stamp = stamp.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let batch = pipeline::process_records(records, stamp);

    if batch.is_empty() {
        eprintln!("[WARN] no predictions in {}", path.display());
        return Ok(());
    }

    println!(
        "{:<36} {:<16} {:>6} {:>7} {:>7} {:>7} {:>5}  ",
        "Match", "Pick", "Odds", "AI P", "BrkEv", "Edge", "Conf"
    );
    for row in export::export_rows(&batch) {
        let flag = if row.edge > scoreai_terminal::model::VALUE_BET_THRESHOLD {
            "VALUE"
        } else {
            ""
        };
        println!(
            "{:<36} {:<16} {:>6.2} {:>6.1}% {:>6.1}% {:>+6.1}% {:>4}%  {flag}",
            format!("{} vs {}", row.home_team, row.away_team),
            row.recommendation,
            row.odds,
            row.ai_probability * 100.0,
            row.break_even * 100.0,
            row.edge * 100.0,
            row.confidence,
        );
    }
    println!(
        "{} predictions, {} value bets",
        batch.results.len(),
        batch.value_bets()
    );

    if let Some(out) = csv_out {
        let report = export::write_csv(&out, &batch)?;
        println!("csv: {} rows -> {}", report.rows, report.path.display());
    }
    if let Some(out) = xlsx_out {
        let report = export::write_xlsx(&out, &batch)?;
        println!("xlsx: {} rows -> {}", report.rows, report.path.display());
    }

    Ok(())
}
