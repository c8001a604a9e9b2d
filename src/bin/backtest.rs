use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use scoreai_terminal::pipeline;
use scoreai_terminal::provider::parse_records_json;
use scoreai_terminal::settle::{self, BetStatus, Settlement};

/// Final score of one fixture, keyed by team names.
#[derive(Debug, serde::Deserialize)]
struct FinalScore {
    #[serde(rename = "homeTeam")]
    home_team: String,
    #[serde(rename = "awayTeam")]
    away_team: String,
    home_goals: u32,
    away_goals: u32,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let mut positional = Vec::new();
    let mut stake = 1.0;
    let mut value_only = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stake" => {
                stake = args
                    .next()
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| *v > 0.0)
                    .unwrap_or(1.0)
            }
            "--value-only" => value_only = true,
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let batch_path = positional
        .next()
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/provider_batch.json"));
    let results_path = positional
        .next()
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/final_scores.json"));

    let raw = fs::read_to_string(&batch_path)
        .with_context(|| format!("read {}", batch_path.display()))?;
    let batch = pipeline::process_records(parse_records_json(&raw)?, 0);

    let raw = fs::read_to_string(&results_path)
        .with_context(|| format!("read {}", results_path.display()))?;
    let scores: Vec<FinalScore> =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", results_path.display()))?;
    let by_teams: HashMap<(&str, &str), &FinalScore> = scores
        .iter()
        .map(|s| ((s.home_team.as_str(), s.away_team.as_str()), s))
        .collect();

    let mut settlements: Vec<Settlement> = Vec::new();
    let mut unsettled = 0usize;
    for result in &batch.results {
        if value_only && !result.is_value_bet() {
            continue;
        }
        let Some(fixture) = batch.fixture(&result.fixture_id) else {
            continue;
        };
        let key = (fixture.home_team.as_str(), fixture.away_team.as_str());
        let Some(score) = by_teams.get(&key) else {
            unsettled += 1;
            continue;
        };
        let actual = settle::classify_result(score.home_goals, score.away_goals);
        let s = settle::settle(result, &fixture.odds, actual, stake);
        println!(
            "{:<36} {:>8} @ {:<5.2} {}-{} {:<4} {:>+8.2}",
            fixture.label(),
            s.bet.code(),
            s.odds,
            score.home_goals,
            score.away_goals,
            if s.status == BetStatus::Won { "WON" } else { "LOST" },
            s.profit
        );
        settlements.push(s);
    }

    if unsettled > 0 {
        eprintln!("[WARN] {unsettled} predictions have no final score");
    }

    let summary = settle::summarize(&settlements);
    println!("Bets: {}", summary.bets);
    println!("Wins: {}", summary.wins);
    println!("Hit rate: {:.1}%", summary.hit_rate * 100.0);
    println!("Staked: {:.2}", summary.staked);
    println!("Profit: {:+.2}", summary.profit);
    println!("ROI: {:+.1}%", summary.roi * 100.0);

    Ok(())
}
