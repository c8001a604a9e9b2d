use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::edge;
use crate::model::{EdgeResult, Fixture, OddsSet, Prob3, ProviderRecord, RawEstimate};
use crate::normalize::normalize;

/// Fixtures and their evaluated predictions from one provider pass.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub fixtures: Vec<Fixture>,
    pub results: Vec<EdgeResult>,
}

impl Batch {
    pub fn fixture(&self, id: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.id == id)
    }

    pub fn value_bets(&self) -> usize {
        self.results.iter().filter(|r| r.is_value_bet()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Split provider rows into fixtures and raw estimates sharing a fresh id.
///
/// Ids are `live-<index>-<stamp>`; pass a per-pass stamp (e.g. unix millis) so ids from
/// different passes never collide.
pub fn assign_fixture_ids(records: Vec<ProviderRecord>, stamp: i64) -> (Vec<Fixture>, Vec<RawEstimate>) {
    let mut fixtures = Vec::with_capacity(records.len());
    let mut estimates = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let id = format!("live-{index}-{stamp}");
        fixtures.push(Fixture {
            id: id.clone(),
            home_team: record.home_team,
            away_team: record.away_team,
            league: record.league,
            date: record.match_date,
            odds: OddsSet::new(record.odds_home, record.odds_draw, record.odds_away),
        });
        estimates.push(RawEstimate {
            fixture_id: id,
            probabilities: Prob3::new(record.home_win_prob, record.draw_prob, record.away_win_prob),
            rationale: record.reasoning,
            confidence: record.confidence_score,
        });
    }

    (fixtures, estimates)
}

/// Normalize and evaluate every estimate against its fixture's odds.
///
/// Estimates whose fixture is not in `fixtures` are skipped. Output order follows
/// `estimates`.
pub fn evaluate_batch(fixtures: &[Fixture], estimates: &[RawEstimate]) -> Vec<EdgeResult> {
    let mut by_id: HashMap<&str, &Fixture> = HashMap::with_capacity(fixtures.len());
    for fixture in fixtures {
        // First fixture wins on duplicate ids, same as `Batch::fixture`.
        by_id.entry(fixture.id.as_str()).or_insert(fixture);
    }

    estimates
        .par_iter()
        .filter_map(|raw| {
            let fixture = by_id.get(raw.fixture_id.as_str())?;
            let normalized = normalize(raw.clone());
            Some(edge::evaluate(&fixture.id, &normalized, &fixture.odds))
        })
        .collect()
}

/// Fixture ids referenced by estimates but missing from `fixtures`.
pub fn unmatched_fixture_ids(fixtures: &[Fixture], estimates: &[RawEstimate]) -> Vec<String> {
    let known: HashSet<&str> = fixtures.iter().map(|f| f.id.as_str()).collect();
    estimates
        .iter()
        .filter(|e| !known.contains(e.fixture_id.as_str()))
        .map(|e| e.fixture_id.clone())
        .collect()
}

pub fn process_records(records: Vec<ProviderRecord>, stamp: i64) -> Batch {
    let (fixtures, estimates) = assign_fixture_ids(records, stamp);
    let results = evaluate_batch(&fixtures, &estimates);
    Batch { fixtures, results }
}

#[cfg(test)]
mod tests {
    use super::assign_fixture_ids;
    use crate::model::ProviderRecord;

    fn record(home: &str, away: &str) -> ProviderRecord {
        ProviderRecord {
            home_team: home.to_string(),
            away_team: away.to_string(),
            league: "Serie A".to_string(),
            match_date: "2026-10-18T18:45:00Z".to_string(),
            odds_home: 2.1,
            odds_draw: 3.3,
            odds_away: 3.6,
            home_win_prob: 48.0,
            draw_prob: 27.0,
            away_win_prob: 25.0,
            reasoning: "Even contest".to_string(),
            confidence_score: 0.64,
        }
    }

    #[test]
    fn ids_are_shared_between_fixture_and_estimate() {
        let (fixtures, estimates) =
            assign_fixture_ids(vec![record("Inter Milan", "Juventus"), record("PSG", "Lyon")], 1700);
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id, "live-0-1700");
        assert_eq!(fixtures[1].id, "live-1-1700");
        assert_eq!(estimates[1].fixture_id, fixtures[1].id);
        assert_eq!(fixtures[0].odds.draw, 3.3);
        assert_eq!(estimates[0].probabilities.home, 48.0);
        assert_eq!(estimates[0].confidence, 0.64);
    }
}
