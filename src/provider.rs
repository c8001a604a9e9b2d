use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::{AppConfig, GeminiConfig, SourceKind};
use crate::fake_feed::FakeSource;
use crate::http_client::http_client;
use crate::model::ProviderRecord;

/// Anything that can hand back one raw batch of fixtures with estimates.
pub trait EstimateSource: Send {
    fn name(&self) -> &str;
    fn fetch_batch(&self) -> Result<Vec<ProviderRecord>>;
}

/// Wraps a closure so tests and callers can inject a batch directly.
pub struct FnSource<F> {
    name: String,
    fetch: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Result<Vec<ProviderRecord>> + Send,
{
    pub fn new(name: impl Into<String>, fetch: F) -> Self {
        Self {
            name: name.into(),
            fetch,
        }
    }
}

impl<F> EstimateSource for FnSource<F>
where
    F: Fn() -> Result<Vec<ProviderRecord>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_batch(&self) -> Result<Vec<ProviderRecord>> {
        (self.fetch)()
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EstimateSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch_batch(&self) -> Result<Vec<ProviderRecord>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading {}", self.path.display()))?;
        parse_records_json(&raw)
    }
}

pub struct GeminiSource {
    cfg: GeminiConfig,
    timeout_secs: u64,
}

impl GeminiSource {
    /// The client is shared process-wide, so `timeout_secs` only applies if this is
    /// the first source to make a request.
    pub fn new(cfg: GeminiConfig, timeout_secs: u64) -> Self {
        Self { cfg, timeout_secs }
    }
}

impl EstimateSource for GeminiSource {
    fn name(&self) -> &str {
        "gemini"
    }

    fn fetch_batch(&self) -> Result<Vec<ProviderRecord>> {
        let Some(api_key) = self.cfg.api_key.as_ref() else {
            return Err(anyhow::anyhow!("API key missing"));
        };

        let today = Local::now().format("%a %b %d %Y").to_string();
        let body = gemini_request_body(&build_prompt(&today, self.cfg.match_count));
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.cfg.base_url, self.cfg.model
        );

        let client = http_client(self.timeout_secs)?;
        let resp = client
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .header(USER_AGENT, "scoreai-terminal/0.1")
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .context("gemini request failed")?;
        let status = resp.status();
        let text = resp.text().context("failed reading gemini body")?;
        if !status.is_success() {
            let snippet = text
                .trim()
                .replace(['\n', '\r'], " ")
                .chars()
                .take(220)
                .collect::<String>();
            return Err(anyhow::anyhow!("gemini http {}: {}", status, snippet));
        }

        parse_gemini_response(&text)
    }
}

pub fn source_from_config(cfg: &AppConfig) -> Box<dyn EstimateSource> {
    match cfg.source {
        SourceKind::Gemini => Box::new(GeminiSource::new(cfg.gemini.clone(), cfg.http_timeout_secs)),
        SourceKind::File => Box::new(FileSource::new(cfg.estimate_file.clone())),
        SourceKind::Demo => Box::new(FakeSource::new(cfg.demo_matches)),
    }
}

pub fn build_prompt(today: &str, match_count: usize) -> String {
    format!(
        "Find {match_count} upcoming confirmed soccer matches scheduled for today ({today}) or tomorrow.

STRICT RULES:
1. ONLY include matches that are actually scheduled. Do NOT invent fixtures.
2. Prioritize major leagues: Premier League, La Liga, Bundesliga, Serie A, Ligue 1, Champions League, MLS.
3. You MUST find real Decimal Odds from Bet365/William Hill for the Home Win, Draw, and Away Win.
4. If you cannot find a match or its odds, do not include it.

For each valid match:
1. Extract Home Team, Away Team, League, and Start Time.
2. Analyze recent form and stats.
3. Calculate TRUE probabilities for Home/Draw/Away (return as decimals, e.g., 0.45 for 45%).
4. Provide reasoning.

Return a JSON array containing match details and analysis."
    )
}

fn gemini_request_body(prompt: &str) -> Value {
    let number = json!({ "type": "NUMBER" });
    let string = json!({ "type": "STRING" });
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "tools": [{ "google_search": {} }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "homeTeam": string,
                        "awayTeam": string,
                        "league": string,
                        "matchDate": string,
                        "odds_home": number,
                        "odds_draw": number,
                        "odds_away": number,
                        "home_win_prob": number,
                        "draw_prob": number,
                        "away_win_prob": number,
                        "reasoning": string,
                        "confidence_score": number
                    },
                    "required": [
                        "homeTeam", "awayTeam", "league", "matchDate",
                        "odds_home", "odds_draw", "odds_away",
                        "home_win_prob", "draw_prob", "away_win_prob",
                        "reasoning", "confidence_score"
                    ]
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// Pull the JSON array out of a `generateContent` response.
pub fn parse_gemini_response(raw: &str) -> Result<Vec<ProviderRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let resp: GeminiResponse = serde_json::from_str(trimmed).context("invalid gemini json")?;
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    parse_records_json(&text)
}

/// Decode a JSON array of provider rows. Tolerates Markdown code fences and prose
/// around the array.
pub fn parse_records_json(raw: &str) -> Result<Vec<ProviderRecord>> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() || body == "null" {
        return Ok(Vec::new());
    }
    if let Ok(records) = serde_json::from_str::<Vec<ProviderRecord>>(body) {
        return Ok(records);
    }

    let (Some(start), Some(end)) = (body.find('['), body.rfind(']')) else {
        return Err(anyhow::anyhow!("no JSON array in provider output"));
    };
    if end < start {
        return Err(anyhow::anyhow!("no JSON array in provider output"));
    }
    serde_json::from_str(&body[start..=end]).context("invalid provider records json")
}

fn strip_code_fence(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
