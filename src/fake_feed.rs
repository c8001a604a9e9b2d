use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;

use crate::model::ProviderRecord;
use crate::provider::EstimateSource;

const TEAMS: &[(&str, &str)] = &[
    ("Arsenal", "Premier League"),
    ("Aston Villa", "Premier League"),
    ("Liverpool", "Premier League"),
    ("Man City", "Premier League"),
    ("Man United", "Premier League"),
    ("Chelsea", "Premier League"),
    ("Tottenham", "Premier League"),
    ("Newcastle", "Premier League"),
    ("Real Madrid", "La Liga"),
    ("Barcelona", "La Liga"),
    ("Bayern Munich", "Bundesliga"),
    ("Dortmund", "Bundesliga"),
    ("PSG", "Ligue 1"),
    ("Inter Milan", "Serie A"),
    ("Juventus", "Serie A"),
];

/// Offline source: random fixtures drawn from a fixed team table, with a bookmaker
/// price built around the "true" probabilities and a noisy model estimate.
pub struct FakeSource {
    matches: usize,
}

impl FakeSource {
    pub fn new(matches: usize) -> Self {
        Self { matches }
    }
}

impl EstimateSource for FakeSource {
    fn name(&self) -> &str {
        "demo"
    }

    fn fetch_batch(&self) -> Result<Vec<ProviderRecord>> {
        let mut rng = rand::thread_rng();
        Ok((0..self.matches).map(|i| fake_record(&mut rng, i)).collect())
    }
}

fn fake_record(rng: &mut ThreadRng, index: usize) -> ProviderRecord {
    let mut picked = TEAMS.choose_multiple(rng, 2);
    let (home, league) = picked.next().copied().unwrap_or(TEAMS[0]);
    let (away, _) = picked.next().copied().unwrap_or(TEAMS[1]);

    let home_strength: f64 = rng.gen_range(0.25..0.60);
    let draw_share: f64 = rng.gen_range(0.20..0.32);
    let away_strength = (1.0 - home_strength - draw_share).max(0.08);
    let sum = home_strength + draw_share + away_strength;
    let (p_home, p_draw, p_away) = (home_strength / sum, draw_share / sum, away_strength / sum);

    // Bookmaker margin around 5%.
    let margin = 1.05;
    let price = |p: f64| ((1.0 / (p * margin)) * 100.0).round() / 100.0;

    let kickoff = Utc::now() + ChronoDuration::hours(2 + (index as i64) * 3);

    // Mix scales the way real model output does: some rows as percentages.
    let as_percent = rng.gen_bool(0.3);
    let scale = if as_percent { 100.0 } else { 1.0 };

    ProviderRecord {
        home_team: home.to_string(),
        away_team: away.to_string(),
        league: league.to_string(),
        match_date: kickoff.format("%Y-%m-%dT%H:%M:00Z").to_string(),
        odds_home: price(p_home).max(1.01),
        odds_draw: price(p_draw).max(1.01),
        odds_away: price(p_away).max(1.01),
        home_win_prob: jitter(rng, p_home) * scale,
        draw_prob: jitter(rng, p_draw) * scale,
        away_win_prob: jitter(rng, p_away) * scale,
        reasoning: format!("Demo estimate: {home} form vs {away} form."),
        confidence_score: if as_percent {
            rng.gen_range(40.0..90.0)
        } else {
            rng.gen_range(0.4..0.9)
        },
    }
}

fn jitter(rng: &mut ThreadRng, p: f64) -> f64 {
    (p + rng.gen_range(-0.06..0.06)).clamp(0.02, 0.95)
}

#[cfg(test)]
mod tests {
    use super::FakeSource;
    use crate::provider::EstimateSource;

    #[test]
    fn fake_batch_has_requested_size_and_sane_odds() {
        let rows = FakeSource::new(12).fetch_batch().expect("fake batch");
        assert_eq!(rows.len(), 12);
        for row in rows {
            assert_ne!(row.home_team, row.away_team);
            assert!(row.odds_home > 1.0 && row.odds_draw > 1.0 && row.odds_away > 1.0);
        }
    }
}
