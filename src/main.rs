use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use scoreai_terminal::config::{AppConfig, load_dotenv};
use scoreai_terminal::edge::break_evens;
use scoreai_terminal::export::default_export_path;
use scoreai_terminal::feed::spawn_provider;
use scoreai_terminal::model::{EdgeResult, Fixture, Outcome};
use scoreai_terminal::provider::source_from_config;
use scoreai_terminal::state::{AppState, Delta, ExportFormat, ProviderCommand, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    export_dir: std::path::PathBuf,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, export_dir: std::path::PathBuf) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            export_dir,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_fetch(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.request_export(ExportFormat::Csv),
            KeyCode::Char('x') | KeyCode::Char('X') => self.request_export(ExportFormat::Xlsx),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn request_fetch(&mut self) {
        if self.state.loading {
            self.state.push_log("[INFO] Fetch already in progress");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Estimate source unavailable");
            return;
        };
        if tx.send(ProviderCommand::Fetch).is_err() {
            self.state.push_log("[WARN] Fetch request failed");
        } else {
            self.state.loading = true;
        }
    }

    fn request_export(&mut self, format: ExportFormat) {
        if self.state.batch.is_empty() {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Export unavailable");
            return;
        };
        let path = default_export_path(
            &self.export_dir,
            Local::now().date_naive(),
            format.extension(),
        );
        let cmd = ProviderCommand::Export {
            path,
            format,
            batch: self.state.batch.clone(),
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Export request failed");
        } else {
            self.state.export.active = true;
            self.state.export.done = false;
            self.state.export.error = None;
        }
    }
}

fn main() -> io::Result<()> {
    load_dotenv();
    let cfg = AppConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(source_from_config(&cfg), tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx), cfg.export_dir.clone());
    app.state.push_log(format!(
        "[INFO] Source {:?}, exports to {}",
        cfg.source,
        cfg.export_dir.display()
    ));
    app.request_fetch();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(42)])
        .split(chunks[1]);
    render_predictions(frame, body[0], &app.state);
    render_detail(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state, 3))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let source = if state.source_name.is_empty() {
        "-".to_string()
    } else {
        state.source_name.to_uppercase()
    };
    let status = if state.loading {
        "FETCHING".to_string()
    } else if let Some(at) = &state.fetched_at {
        format!("Updated {at}")
    } else {
        "Idle".to_string()
    };
    let line1 = format!(
        "  SCOREAI VALUE TERMINAL | Source: {source} | {status} | Picks: {} | Value: {}",
        state.batch.results.len(),
        state.batch.value_bets()
    );
    let line2 = "  Edge = P(model) x Odds - 1 | Value bet when edge > 5%".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    let base = "r Fetch | j/k/↑/↓ Move | e CSV | x XLSX | ? Help | q Quit";
    if !state.export.active {
        return base.to_string();
    }
    if !state.export.done {
        return format!("{base} | Exporting...");
    }
    match (&state.export.error, &state.export.path) {
        (Some(err), _) => format!("{base} | Export failed: {err}"),
        (None, Some(path)) => format!("{base} | Saved {} rows to {path}", state.export.rows),
        (None, None) => base.to_string(),
    }
}

fn prediction_columns() -> [Constraint; 9] {
    [
        Constraint::Min(22),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(6),
    ]
}

fn render_predictions(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Predictions").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let widths = prediction_columns();
    render_prediction_header(frame, sections[0], &widths);

    let list_area = sections[1];
    if state.batch.is_empty() {
        let msg = if state.loading {
            "Scanning markets for value...".to_string()
        } else if let Some(err) = &state.error {
            err.clone()
        } else {
            "Press r to fetch today's fixtures".to_string()
        };
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let total = state.batch.results.len();
    let (start, end) = visible_range(state.selected, total, visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let result = &state.batch.results[idx];
        let Some(fixture) = state.batch.fixture(&result.fixture_id) else {
            render_cell_text(frame, cols[0], &result.fixture_id, row_style);
            continue;
        };

        let edge_style = if result.is_value_bet() {
            row_style.fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if result.edge > 0.0 {
            row_style.fg(Color::Yellow)
        } else {
            row_style.fg(Color::Red)
        };

        render_cell_text(frame, cols[0], &fixture.label(), row_style);
        render_cell_text(frame, cols[1], &fixture.league, row_style);
        render_cell_text(frame, cols[2], pick_label(result, fixture).as_str(), row_style);
        render_cell_text(
            frame,
            cols[3],
            &format!("{:.2}", fixture.odds.get(result.recommended)),
            row_style,
        );
        render_cell_text(frame, cols[4], &pct(result.model_probability()), row_style);
        render_cell_text(frame, cols[5], &pct(result.break_even), row_style);
        render_cell_text(frame, cols[6], &format!("{:+.1}%", result.edge * 100.0), edge_style);
        render_cell_text(frame, cols[7], &format!("{}%", result.confidence), row_style);
        let flag = if result.is_value_bet() { "VALUE" } else { "" };
        render_cell_text(frame, cols[8], flag, edge_style);
    }
}

fn render_prediction_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    for (col, label) in [
        "Match", "League", "Pick", "Odds", "AI P", "BreakEv", "Edge", "Conf", "",
    ]
    .iter()
    .enumerate()
    {
        render_cell_text(frame, cols[col], label, style);
    }
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Length(5), Constraint::Min(1)])
        .split(area);

    let (Some(result), Some(fixture)) = (state.selected_result(), state.selected_fixture()) else {
        let empty = Paragraph::new("No prediction selected")
            .block(Block::default().title("Detail").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let summary = Paragraph::new(detail_text(result, fixture))
        .block(Block::default().title("Detail").borders(Borders::ALL));
    frame.render_widget(summary, rows[0]);

    let chart_block = Block::default().title("Model H/D/A").borders(Borders::ALL);
    let chart_area = chart_block.inner(rows[1]);
    frame.render_widget(chart_block, rows[1]);
    frame.render_widget(probability_bar_chart(result), chart_area);

    let rationale = Paragraph::new(result.rationale.as_str())
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Reasoning").borders(Borders::ALL));
    frame.render_widget(rationale, rows[2]);
}

fn detail_text(result: &EdgeResult, fixture: &Fixture) -> String {
    let be = break_evens(&fixture.odds);
    let mut lines = vec![
        fixture.label(),
        format!("{} | {}", fixture.league, fixture.date_only()),
        format!(
            "Odds H {:.2}  D {:.2}  A {:.2}",
            fixture.odds.home, fixture.odds.draw, fixture.odds.away
        ),
        format!(
            "Pick {} @ {:.2}  edge {:+.1}%",
            pick_label(result, fixture),
            fixture.odds.get(result.recommended),
            result.edge * 100.0
        ),
        format!(
            "Break-even H {}  D {}  A {}",
            pct(be.home),
            pct(be.draw),
            pct(be.away)
        ),
        format!("Confidence {}%", result.confidence),
    ];
    if !fixture.odds.is_well_formed() {
        lines.push("Odds <= 1.0 in feed".to_string());
    }
    lines.join("\n")
}

fn probability_bar_chart(result: &EdgeResult) -> BarChart<'static> {
    let bar = |outcome: Outcome, label: &'static str, color: Color| {
        let value = (result.probabilities.get(outcome) * 100.0).round().max(0.0) as u64;
        let style = if outcome == result.recommended {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        Bar::default()
            .label(Line::from(label))
            .value(value)
            .text_value(format!("{value}%"))
            .style(style)
    };

    BarChart::default()
        .data(BarGroup::default().bars(&[
            bar(Outcome::HomeWin, "H", Color::Green),
            bar(Outcome::Draw, "D", Color::Yellow),
            bar(Outcome::AwayWin, "A", Color::Red),
        ]))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100)
}

fn pick_label(result: &EdgeResult, fixture: &Fixture) -> String {
    match result.recommended {
        Outcome::Draw => "Draw".to_string(),
        other => fixture.outcome_name(other).to_string(),
    }
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState, lines: usize) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(lines);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "ScoreAI Value Terminal - Help",
        "",
        "  r            Fetch a fresh batch",
        "  j/k or ↑/↓   Move selection",
        "  e            Export CSV",
        "  x            Export XLSX",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Edge = model probability x decimal odds - 1.",
        "Break-even = 1 / odds. VALUE marks edge above 5%.",
        "Rows are sorted by edge, highest first.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
