use crate::model::{EdgeResult, NormalizedEstimate, OddsSet, Outcome, Prob3, VALUE_BET_THRESHOLD};

/// Expected profit per unit staked: `p * odds - 1`.
pub fn edge_for(probability: f64, odds: f64) -> f64 {
    probability * odds - 1.0
}

/// Minimum win probability at which the price stops losing money: `1 / odds`.
pub fn break_even_for(odds: f64) -> f64 {
    1.0 / odds
}

pub fn edges(probabilities: &Prob3, odds: &OddsSet) -> Prob3 {
    Prob3::new(
        edge_for(probabilities.home, odds.home),
        edge_for(probabilities.draw, odds.draw),
        edge_for(probabilities.away, odds.away),
    )
}

pub fn break_evens(odds: &OddsSet) -> Prob3 {
    Prob3::new(
        break_even_for(odds.home),
        break_even_for(odds.draw),
        break_even_for(odds.away),
    )
}

pub fn is_value_bet(edge: f64) -> bool {
    edge > VALUE_BET_THRESHOLD
}

/// Outcome with the highest edge. Replacement is strict, so earlier outcomes in
/// `Outcome::ALL` keep ties.
pub fn best_edge_outcome(edges: &Prob3) -> Outcome {
    let mut best = Outcome::HomeWin;
    for outcome in &Outcome::ALL[1..] {
        if edges.get(*outcome) > edges.get(best) {
            best = *outcome;
        }
    }
    best
}

/// Pick used when no outcome has positive edge. Draw must beat both sides; away only
/// has to beat home. Draw and away are never compared with each other.
pub fn most_likely_outcome(probabilities: &Prob3) -> Outcome {
    let Prob3 { home, draw, away } = *probabilities;
    if draw > home && draw > away {
        Outcome::Draw
    } else if away > home {
        Outcome::AwayWin
    } else {
        Outcome::HomeWin
    }
}

/// Odds at or below 1.0 are the caller's problem: the arithmetic still runs.
pub fn evaluate(fixture_id: &str, normalized: &NormalizedEstimate, odds: &OddsSet) -> EdgeResult {
    let probabilities = normalized.probabilities;
    let per_outcome = edges(&probabilities, odds);

    let mut recommended = best_edge_outcome(&per_outcome);
    if per_outcome.get(recommended) <= 0.0 {
        recommended = most_likely_outcome(&probabilities);
    }

    let outcome_odds = odds.get(recommended);
    EdgeResult {
        fixture_id: fixture_id.to_string(),
        probabilities,
        recommended,
        break_even: break_even_for(outcome_odds),
        edge: edge_for(probabilities.get(recommended), outcome_odds),
        confidence: normalized.confidence.round() as i32,
        rationale: normalized.rationale.clone(),
    }
}
