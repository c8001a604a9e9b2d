use std::env;
use std::path::PathBuf;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_MATCH_COUNT: usize = 8;
const DEFAULT_DEMO_MATCHES: usize = 8;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Gemini,
    File,
    Demo,
}

impl SourceKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" | "live" => Some(SourceKind::Gemini),
            "file" => Some(SourceKind::File),
            "demo" | "fake" => Some(SourceKind::Demo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub match_count: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceKind,
    pub gemini: GeminiConfig,
    pub estimate_file: PathBuf,
    pub demo_matches: usize,
    pub export_dir: PathBuf,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Reads the process environment. Call `load_dotenv` first to pick up `.env` files.
    pub fn from_env() -> Self {
        let source = env::var("ESTIMATE_SOURCE")
            .ok()
            .and_then(|v| SourceKind::parse(&v))
            .unwrap_or(SourceKind::Gemini);
        let api_key = non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("API_KEY"));
        let model = non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let base_url = non_empty_env("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let match_count = env_usize("MATCH_COUNT")
            .unwrap_or(DEFAULT_MATCH_COUNT)
            .clamp(1, 20);

        Self {
            source,
            gemini: GeminiConfig {
                api_key,
                model,
                base_url,
                match_count,
            },
            estimate_file: non_empty_env("ESTIMATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("batch.json")),
            demo_matches: env_usize("DEMO_MATCHES")
                .unwrap_or(DEFAULT_DEMO_MATCHES)
                .clamp(1, 32),
            export_dir: non_empty_env("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
                .clamp(5, 300),
        }
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.trim().parse::<usize>().ok())
}
