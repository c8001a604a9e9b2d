use serde::{Deserialize, Serialize};

/// Edge above which a recommendation is flagged as a value bet.
pub const VALUE_BET_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// Evaluation order. Earlier outcomes win ties.
    pub const ALL: [Outcome; 3] = [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin];

    pub fn code(self) -> &'static str {
        match self {
            Outcome::HomeWin => "HOME_WIN",
            Outcome::Draw => "DRAW",
            Outcome::AwayWin => "AWAY_WIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Prob3 {
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::HomeWin => self.home,
            Outcome::Draw => self.draw,
            Outcome::AwayWin => self.away,
        }
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            home: f(self.home),
            draw: f(self.draw),
            away: f(self.away),
        }
    }
}

/// Decimal odds quoted by one bookmaker for one fixture. The margin is left in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsSet {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OddsSet {
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::HomeWin => self.home,
            Outcome::Draw => self.draw,
            Outcome::AwayWin => self.away,
        }
    }

    /// Decimal odds at or below 1.0 are an upstream data error.
    pub fn is_well_formed(&self) -> bool {
        Outcome::ALL.iter().all(|o| self.get(*o) > 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub date: String,
    pub odds: OddsSet,
}

impl Fixture {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Date part of the raw kickoff string (everything before `T`).
    pub fn date_only(&self) -> &str {
        self.date.split('T').next().unwrap_or_default()
    }

    pub fn outcome_name(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::HomeWin => &self.home_team,
            Outcome::Draw => "Draw",
            Outcome::AwayWin => &self.away_team,
        }
    }
}

/// Unvalidated estimate as returned by the provider. Both the probabilities and the
/// confidence may be fractions or percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEstimate {
    pub fixture_id: String,
    pub probabilities: Prob3,
    pub rationale: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEstimate {
    pub fixture_id: String,
    pub probabilities: Prob3,
    pub rationale: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResult {
    pub fixture_id: String,
    pub probabilities: Prob3,
    pub recommended: Outcome,
    pub break_even: f64,
    pub edge: f64,
    pub confidence: i32,
    pub rationale: String,
}

impl EdgeResult {
    pub fn is_value_bet(&self) -> bool {
        crate::edge::is_value_bet(self.edge)
    }

    /// Model probability of the recommended outcome.
    pub fn model_probability(&self) -> f64 {
        self.probabilities.get(self.recommended)
    }
}

/// One row of the estimate provider's output before a fixture id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    #[serde(rename = "homeTeam")]
    pub home_team: String,
    #[serde(rename = "awayTeam")]
    pub away_team: String,
    #[serde(default)]
    pub league: String,
    #[serde(rename = "matchDate", default)]
    pub match_date: String,
    pub odds_home: f64,
    pub odds_draw: f64,
    pub odds_away: f64,
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub confidence_score: f64,
}

#[cfg(test)]
mod tests {
    use super::{Fixture, OddsSet, Outcome, ProviderRecord};

    #[test]
    fn outcome_serializes_with_wire_names() {
        let json = serde_json::to_string(&Outcome::ALL).unwrap();
        assert_eq!(json, r#"["HOME_WIN","DRAW","AWAY_WIN"]"#);
    }

    #[test]
    fn odds_below_one_are_not_well_formed() {
        assert!(OddsSet::new(2.0, 3.5, 4.0).is_well_formed());
        assert!(!OddsSet::new(1.0, 3.5, 4.0).is_well_formed());
        assert!(!OddsSet::new(2.0, 0.8, 4.0).is_well_formed());
    }

    #[test]
    fn fixture_date_only_strips_time() {
        let fixture = Fixture {
            id: "f".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            league: "Premier League".to_string(),
            date: "2026-10-18T15:00:00Z".to_string(),
            odds: OddsSet::new(2.0, 3.4, 3.8),
        };
        assert_eq!(fixture.date_only(), "2026-10-18");
        assert_eq!(fixture.outcome_name(Outcome::AwayWin), "Chelsea");
    }

    #[test]
    fn provider_record_tolerates_missing_optional_fields() {
        let raw = r#"{
            "homeTeam": "Inter Milan", "awayTeam": "Juventus",
            "odds_home": 1.9, "odds_draw": 3.4, "odds_away": 4.2,
            "home_win_prob": 52, "draw_prob": 27, "away_win_prob": 21
        }"#;
        let record: ProviderRecord = serde_json::from_str(raw).expect("record should parse");
        assert_eq!(record.home_team, "Inter Milan");
        assert!(record.reasoning.is_empty());
        assert_eq!(record.confidence_score, 0.0);
    }
}
