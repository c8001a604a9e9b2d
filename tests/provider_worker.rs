use std::sync::mpsc;

use scoreai_terminal::feed::run_fetch;
use scoreai_terminal::model::ProviderRecord;
use scoreai_terminal::provider::FnSource;
use scoreai_terminal::state::{AppState, Delta, apply_delta};

fn record(home: &str, away: &str, probs: (f64, f64, f64)) -> ProviderRecord {
    ProviderRecord {
        home_team: home.to_string(),
        away_team: away.to_string(),
        league: "MLS".to_string(),
        match_date: "2026-10-18T23:30:00Z".to_string(),
        odds_home: 2.0,
        odds_draw: 3.5,
        odds_away: 4.0,
        home_win_prob: probs.0,
        draw_prob: probs.1,
        away_win_prob: probs.2,
        reasoning: "stub".to_string(),
        confidence_score: 0.7,
    }
}

#[test]
fn injected_source_produces_sorted_batch() {
    let source = FnSource::new("stub", || {
        Ok(vec![
            record("LA Galaxy", "LAFC", (0.48, 0.28, 0.24)),
            record("Inter Miami", "Orlando City", (0.55, 0.25, 0.20)),
        ])
    });
    let (tx, rx) = mpsc::channel();
    run_fetch(&source, &tx);
    drop(tx);

    let mut state = AppState::new();
    for delta in rx.iter() {
        apply_delta(&mut state, delta);
    }

    assert_eq!(state.source_name, "stub");
    assert_eq!(state.batch.results.len(), 2);
    let first = state.selected_fixture().expect("selected fixture");
    assert_eq!(first.home_team, "Inter Miami");
    assert!(state.logs.iter().any(|l| l.contains("1 value bets")));
}

#[test]
fn failing_source_reports_fetch_failed() {
    let source = FnSource::new("broken", || Err(anyhow::anyhow!("gemini http 403: denied")));
    let (tx, rx) = mpsc::channel();
    run_fetch(&source, &tx);
    drop(tx);

    let deltas: Vec<Delta> = rx.iter().collect();
    assert!(
        deltas
            .iter()
            .any(|d| matches!(d, Delta::FetchFailed(msg) if msg.contains("403")))
    );
}
