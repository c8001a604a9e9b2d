use std::fs;
use std::path::PathBuf;

use scoreai_terminal::model::{Fixture, OddsSet, Outcome, Prob3, RawEstimate};
use scoreai_terminal::pipeline::{Batch, evaluate_batch, process_records, unmatched_fixture_ids};
use scoreai_terminal::provider::parse_records_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture(id: &str, odds: OddsSet) -> Fixture {
    Fixture {
        id: id.to_string(),
        home_team: format!("{id} Home"),
        away_team: format!("{id} Away"),
        league: "Test League".to_string(),
        date: "2026-10-18T15:00:00Z".to_string(),
        odds,
    }
}

fn raw(id: &str, home: f64, draw: f64, away: f64) -> RawEstimate {
    RawEstimate {
        fixture_id: id.to_string(),
        probabilities: Prob3::new(home, draw, away),
        rationale: String::new(),
        confidence: 0.6,
    }
}

#[test]
fn empty_batch_yields_empty_output() {
    assert!(evaluate_batch(&[], &[]).is_empty());
    assert!(process_records(Vec::new(), 1).is_empty());
}

#[test]
fn unmatched_estimate_is_dropped_without_touching_others() {
    let fixtures = vec![
        fixture("a", OddsSet::new(2.0, 3.5, 4.0)),
        fixture("b", OddsSet::new(2.6, 3.1, 2.9)),
    ];
    let clean = vec![raw("a", 0.55, 0.25, 0.20), raw("b", 35.0, 30.0, 35.0)];
    let mut dirty = clean.clone();
    dirty.insert(1, raw("X", 0.9, 0.05, 0.05));

    let baseline = evaluate_batch(&fixtures, &clean);
    let with_orphan = evaluate_batch(&fixtures, &dirty);

    assert_eq!(with_orphan, baseline);
    assert!(with_orphan.iter().all(|r| r.fixture_id != "X"));
    assert_eq!(unmatched_fixture_ids(&fixtures, &dirty), vec!["X".to_string()]);
}

#[test]
fn output_order_follows_estimates() {
    let fixtures: Vec<Fixture> = (0..64)
        .map(|i| fixture(&format!("f{i}"), OddsSet::new(2.0, 3.4, 3.9)))
        .collect();
    let estimates: Vec<RawEstimate> = (0..64)
        .rev()
        .map(|i| raw(&format!("f{i}"), 0.5, 0.3, 0.2))
        .collect();

    let results = evaluate_batch(&fixtures, &estimates);
    let ids: Vec<&str> = results.iter().map(|r| r.fixture_id.as_str()).collect();
    let expected: Vec<String> = (0..64).rev().map(|i| format!("f{i}")).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn provider_fixture_batch_evaluates() {
    let records = parse_records_json(&read_fixture("provider_batch.json")).expect("batch parses");
    let batch = process_records(records, 42);

    assert_eq!(batch.fixtures.len(), 4);
    assert_eq!(batch.results.len(), 4);
    assert_eq!(batch.fixtures[2].id, "live-2-42");
    assert_eq!(batch.value_bets(), 2);

    let picks: Vec<Outcome> = batch.results.iter().map(|r| r.recommended).collect();
    assert_eq!(
        picks,
        vec![Outcome::HomeWin, Outcome::Draw, Outcome::HomeWin, Outcome::AwayWin]
    );

    // Percent-scale row.
    let clasico = &batch.results[1];
    assert!((clasico.probabilities.home - 0.40).abs() < 1e-9);
    assert!((clasico.edge - 0.08).abs() < 1e-9);
    assert_eq!(clasico.confidence, 71);

    // No positive edge: falls back to the favourite rather than the least-bad edge.
    let psg = &batch.results[2];
    assert!((psg.edge - -0.09).abs() < 1e-9);
    assert!((psg.break_even - 1.0 / 1.3).abs() < 1e-9);
    assert_eq!(psg.confidence, 60);
}

#[test]
fn duplicate_fixture_ids_resolve_to_the_first_fixture() {
    let fixtures = vec![
        fixture("d", OddsSet::new(2.0, 3.5, 4.0)),
        fixture("d", OddsSet::new(5.0, 3.5, 4.0)),
    ];
    let results = evaluate_batch(&fixtures, &[raw("d", 0.55, 0.25, 0.20)]);
    assert_eq!(results.len(), 1);
    assert!((results[0].edge - 0.10).abs() < 1e-9);
    assert!((results[0].break_even - 0.5).abs() < 1e-9);

    let batch = Batch { fixtures, results };
    let shown = batch.fixture("d").expect("fixture");
    assert!((shown.odds.get(batch.results[0].recommended) - 2.0).abs() < 1e-9);
}
