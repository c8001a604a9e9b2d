use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::model::{EdgeResult, Fixture, Outcome};
use crate::pipeline::Batch;

pub const HEADERS: [&str; 11] = [
    "Date",
    "League",
    "Home Team",
    "Away Team",
    "Recommendation",
    "Odds",
    "Confidence",
    "AI Probability",
    "Implied (Break Even)",
    "Value Edge",
    "Reasoning",
];

/// One flattened prediction, ready for a spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub date: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub recommendation: String,
    pub odds: f64,
    pub confidence: i32,
    pub ai_probability: f64,
    pub break_even: f64,
    pub edge: f64,
    pub reasoning: String,
}

pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
    pub skipped: usize,
}

pub fn recommendation_label(outcome: Outcome, fixture: &Fixture) -> String {
    match outcome {
        Outcome::HomeWin => format!("Home ({})", fixture.home_team),
        Outcome::Draw => "Draw".to_string(),
        Outcome::AwayWin => format!("Away ({})", fixture.away_team),
    }
}

pub fn export_row(result: &EdgeResult, fixture: &Fixture) -> ExportRow {
    ExportRow {
        date: fixture.date_only().to_string(),
        league: fixture.league.clone(),
        home_team: fixture.home_team.clone(),
        away_team: fixture.away_team.clone(),
        recommendation: recommendation_label(result.recommended, fixture),
        odds: fixture.odds.get(result.recommended),
        confidence: result.confidence,
        ai_probability: result.model_probability(),
        break_even: result.break_even,
        edge: result.edge,
        reasoning: result.rationale.clone(),
    }
}

/// Rows in batch order. Results whose fixture is gone are skipped.
pub fn export_rows(batch: &Batch) -> Vec<ExportRow> {
    batch
        .results
        .iter()
        .filter_map(|r| batch.fixture(&r.fixture_id).map(|f| export_row(r, f)))
        .collect()
}

pub fn csv_string(rows: &[ExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADERS.join(","));
    for row in rows {
        lines.push(
            [
                quote(&row.date),
                quote(&row.league),
                quote(&row.home_team),
                quote(&row.away_team),
                quote(&row.recommendation),
                row.odds.to_string(),
                format!("{}%", row.confidence),
                pct(row.ai_probability),
                pct(row.break_even),
                pct(row.edge),
                quote(&row.reasoning),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

pub fn write_csv(path: &Path, batch: &Batch) -> Result<ExportReport> {
    let rows = export_rows(batch);
    fs::write(path, csv_string(&rows))
        .with_context(|| format!("failed writing csv to {}", path.display()))?;
    Ok(ExportReport {
        path: path.to_path_buf(),
        rows: rows.len(),
        skipped: batch.results.len() - rows.len(),
    })
}

pub fn write_xlsx(path: &Path, batch: &Batch) -> Result<ExportReport> {
    let rows = export_rows(batch);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_sheet(sheet, &rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        rows: rows.len(),
        skipped: batch.results.len() - rows.len(),
    })
}

/// `ScoreAI_Predictions_<date>.<ext>` inside `dir`.
pub fn default_export_path(dir: &Path, date: NaiveDate, ext: &str) -> PathBuf {
    dir.join(format!("ScoreAI_Predictions_{}.{ext}", date.format("%Y-%m-%d")))
}

fn write_sheet(worksheet: &mut Worksheet, rows: &[ExportRow]) -> Result<()> {
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .with_context(|| format!("write header {col}"))?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        let text_cells = [
            (0u16, row.date.as_str()),
            (1, row.league.as_str()),
            (2, row.home_team.as_str()),
            (3, row.away_team.as_str()),
            (4, row.recommendation.as_str()),
            (10, row.reasoning.as_str()),
        ];
        for (col, value) in text_cells {
            worksheet
                .write_string(r, col, value)
                .with_context(|| format!("write cell ({r},{col})"))?;
        }
        let number_cells = [
            (5u16, row.odds),
            (6, f64::from(row.confidence)),
            (7, row.ai_probability * 100.0),
            (8, row.break_even * 100.0),
            (9, row.edge * 100.0),
        ];
        for (col, value) in number_cells {
            worksheet
                .write_number(r, col, value)
                .with_context(|| format!("write cell ({r},{col})"))?;
        }
    }
    Ok(())
}

fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::{pct, quote};

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote(r#"He said "park the bus""#), r#""He said ""park the bus""""#);
        assert_eq!(quote("a,b"), "\"a,b\"");
    }

    #[test]
    fn pct_uses_one_decimal() {
        assert_eq!(pct(0.1), "10.0%");
        assert_eq!(pct(-0.125), "-12.5%");
        assert_eq!(pct(0.5), "50.0%");
    }
}
