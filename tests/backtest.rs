use std::fs;
use std::path::PathBuf;

use scoreai_terminal::pipeline::process_records;
use scoreai_terminal::provider::parse_records_json;
use scoreai_terminal::settle::{BetStatus, classify_result, settle, summarize};

#[derive(serde::Deserialize)]
struct FinalScore {
    #[serde(rename = "homeTeam")]
    home_team: String,
    home_goals: u32,
    away_goals: u32,
}

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn settles_fixture_batch_against_final_scores() {
    let batch = process_records(
        parse_records_json(&read_fixture("provider_batch.json")).expect("batch parses"),
        0,
    );
    let scores: Vec<FinalScore> =
        serde_json::from_str(&read_fixture("final_scores.json")).expect("scores parse");

    let settlements: Vec<_> = batch
        .results
        .iter()
        .map(|r| {
            let fixture = batch.fixture(&r.fixture_id).expect("fixture present");
            let score = scores
                .iter()
                .find(|s| s.home_team == fixture.home_team)
                .expect("score present");
            settle(
                r,
                &fixture.odds,
                classify_result(score.home_goals, score.away_goals),
                1.0,
            )
        })
        .collect();

    let statuses: Vec<BetStatus> = settlements.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![BetStatus::Won, BetStatus::Won, BetStatus::Lost, BetStatus::Won]
    );

    let summary = summarize(&settlements);
    assert_eq!(summary.bets, 4);
    assert_eq!(summary.wins, 3);
    assert!((summary.hit_rate - 0.75).abs() < 1e-9);
    // 1.1 + 2.6 - 1.0 + 0.8
    assert!((summary.profit - 3.5).abs() < 1e-9);
    assert!((summary.roi - 0.875).abs() < 1e-9);
}

#[test]
fn value_bets_only_subset() {
    let batch = process_records(
        parse_records_json(&read_fixture("provider_batch.json")).expect("batch parses"),
        0,
    );
    let value: Vec<_> = batch.results.iter().filter(|r| r.is_value_bet()).collect();
    assert_eq!(value.len(), 2);
    assert!(value.iter().all(|r| r.edge > 0.05));
}
