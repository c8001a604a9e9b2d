use serde::{Deserialize, Serialize};

use crate::model::{EdgeResult, OddsSet, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetStatus {
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub fixture_id: String,
    pub bet: Outcome,
    pub actual: Outcome,
    pub odds: f64,
    pub stake: f64,
    pub status: BetStatus,
    pub profit: f64,
    pub confidence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SettlementSummary {
    pub bets: usize,
    pub wins: usize,
    pub hit_rate: f64,
    pub staked: f64,
    pub profit: f64,
    pub roi: f64,
}

pub fn classify_result(home_goals: u32, away_goals: u32) -> Outcome {
    if home_goals > away_goals {
        Outcome::HomeWin
    } else if home_goals < away_goals {
        Outcome::AwayWin
    } else {
        Outcome::Draw
    }
}

/// Settle the recommended outcome at a flat stake.
pub fn settle(result: &EdgeResult, odds: &OddsSet, actual: Outcome, stake: f64) -> Settlement {
    let price = odds.get(result.recommended);
    let (status, profit) = if result.recommended == actual {
        (BetStatus::Won, stake * price - stake)
    } else {
        (BetStatus::Lost, -stake)
    };
    Settlement {
        fixture_id: result.fixture_id.clone(),
        bet: result.recommended,
        actual,
        odds: price,
        stake,
        status,
        profit,
        confidence: result.confidence,
    }
}

pub fn summarize(settlements: &[Settlement]) -> SettlementSummary {
    if settlements.is_empty() {
        return SettlementSummary::default();
    }

    let wins = settlements
        .iter()
        .filter(|s| s.status == BetStatus::Won)
        .count();
    let staked: f64 = settlements.iter().map(|s| s.stake).sum();
    let profit: f64 = settlements.iter().map(|s| s.profit).sum();

    SettlementSummary {
        bets: settlements.len(),
        wins,
        hit_rate: wins as f64 / settlements.len() as f64,
        staked,
        profit,
        roi: if staked > 0.0 { profit / staked } else { 0.0 },
    }
}
