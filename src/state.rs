use std::collections::VecDeque;
use std::path::PathBuf;

use crate::model::{EdgeResult, Fixture};
use crate::pipeline::Batch;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<String>,
    pub rows: usize,
    pub error: Option<String>,
    pub last_updated: Option<std::time::Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            active: false,
            done: false,
            path: None,
            rows: 0,
            error: None,
            last_updated: None,
        }
    }

    pub fn clear_if_done_for(&mut self, now: std::time::Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub source_name: String,
    pub batch: Batch,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub fetched_at: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            source_name: String::new(),
            batch: Batch::default(),
            selected: 0,
            loading: false,
            error: None,
            fetched_at: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            export: ExportState::new(),
        }
    }

    pub fn maybe_clear_export(&mut self, now: std::time::Instant) {
        self.export.clear_if_done_for(now, 8);
    }

    pub fn selected_result(&self) -> Option<&EdgeResult> {
        self.batch.results.get(self.selected)
    }

    pub fn selected_fixture(&self) -> Option<&Fixture> {
        self.selected_result()
            .and_then(|r| self.batch.fixture(&r.fixture_id))
    }

    pub fn select_next(&mut self) {
        let total = self.batch.results.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let total = self.batch.results.len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    FetchStarted {
        source: String,
    },
    SetBatch {
        source: String,
        fetched_at: String,
        batch: Batch,
    },
    FetchFailed(String),
    ExportFinished {
        path: String,
        rows: usize,
    },
    ExportFailed(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Fetch,
    Export {
        path: PathBuf,
        format: ExportFormat,
        batch: Batch,
    },
}

/// Highest edge first; ties keep provider order.
pub fn sort_by_edge(results: &mut [EdgeResult]) {
    results.sort_by(|a, b| b.edge.total_cmp(&a.edge));
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::FetchStarted { source } => {
            state.loading = true;
            state.error = None;
            state.source_name = source;
        }
        Delta::SetBatch {
            source,
            fetched_at,
            mut batch,
        } => {
            sort_by_edge(&mut batch.results);
            state.loading = false;
            state.source_name = source;
            state.fetched_at = Some(fetched_at);
            state.error = if batch.is_empty() {
                Some("No confirmed matches found for today/tomorrow with available odds.".to_string())
            } else {
                None
            };
            state.batch = batch;
            state.selected = 0;
        }
        Delta::FetchFailed(err) => {
            state.loading = false;
            state.error = Some("Failed to fetch live matches. Please check your API Key.".to_string());
            state.push_log(format!("[WARN] Fetch failed: {err}"));
        }
        Delta::ExportFinished { path, rows } => {
            state.export.active = true;
            state.export.done = true;
            state.export.rows = rows;
            state.export.error = None;
            state.export.path = Some(path.clone());
            state.export.last_updated = Some(std::time::Instant::now());
            state.push_log(format!("[INFO] Exported {rows} rows to {path}"));
        }
        Delta::ExportFailed(err) => {
            state.export.active = true;
            state.export.done = true;
            state.export.error = Some(err.clone());
            state.export.last_updated = Some(std::time::Instant::now());
            state.push_log(format!("[WARN] Export failed: {err}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
    state.clamp_selection();
}
