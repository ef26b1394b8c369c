//! Core TUI application state and event loop.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use tracing::warn;

use crate::screens::{Action, HISTORY_LIMIT, RECENT_LIMIT, ScreenId, Screens};
use crate::session::Session;
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Available screens.
    pub screens: Vec<ScreenId>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Per-screen state.
    pub state: Screens,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            active_tab: 0,
            screens: vec![ScreenId::Extract, ScreenId::History],
            should_quit: false,
            status: "Ready. Press ? for help".to_string(),
            show_help: false,
            state: Screens::new(),
        }
    }

    fn current_id(&self) -> ScreenId {
        self.screens[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.state.is_editing(self.current_id())
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(session: Session) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = if session.missing_keys().is_empty() {
        run_app(&mut terminal, &session)
    } else {
        run_blocked(&mut terminal, session.missing_keys())
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn run_app(terminal: &mut Term, session: &Session) -> Result<()> {
    let mut app = App::new();
    refresh_history(&mut app, session);

    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let action = handle_key(&mut app, key.code, key.modifiers);
                    perform(terminal, &mut app, session, action)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Shown instead of the app when API keys are missing. Only quits.
fn run_blocked(terminal: &mut Term, missing: &[String]) -> Result<()> {
    loop {
        terminal.draw(|f| draw_missing_keys(f, missing))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) || ctrl_c {
                    return Ok(());
                }
            }
        }
    }
}

fn perform(terminal: &mut Term, app: &mut App, session: &Session, action: Action) -> Result<()> {
    match action {
        Action::None => {}
        Action::Extract(name) => {
            app.state.extract.set_processing(&name);
            app.status = format!("Processing {}...", name.trim());
            terminal.draw(|f| draw(f, app))?;

            let outcome = session.extract(&name);
            app.status = match &outcome {
                companyscout_shared::ExtractionOutcome::Success { id, .. } => {
                    format!("Stored as row {id}")
                }
                companyscout_shared::ExtractionOutcome::Failure { .. } => {
                    "Extraction failed".to_string()
                }
            };
            app.state.extract.set_outcome(outcome);
            refresh_history(app, session);
        }
        Action::RefreshHistory => refresh_history(app, session),
    }
    Ok(())
}

/// Reload the recent rows on the Extract tab and the newest rows on History.
fn refresh_history(app: &mut App, session: &Session) {
    match session.history(Some(HISTORY_LIMIT)) {
        Ok(history) => {
            let recent = history
                .records
                .iter()
                .take(RECENT_LIMIT as usize)
                .cloned()
                .collect();
            app.state.extract.set_recent(recent, history.total);
            app.state.history.set_entries(history.records, history.total);
        }
        Err(e) => {
            warn!(error = %e, "failed to load stored companies");
            app.state.history.set_status(format!("Failed to load: {e}"));
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return Action::None;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return Action::None;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return Action::None;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return Action::None;
        }
        KeyCode::Char(c @ '1'..='2') if !app.is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            if idx < app.screens.len() {
                app.active_tab = idx;
                app.status = app.screens[idx].to_string();
            }
            return Action::None;
        }
        KeyCode::Tab | KeyCode::BackTab if !app.is_editing() => {
            app.active_tab = (app.active_tab + 1) % app.screens.len();
            app.status = app.current_id().to_string();
            return Action::None;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return Action::None;
    }

    let id = app.current_id();
    app.state.handle_key(id, code, modifiers)
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let tab_titles: Vec<Line> = app
        .screens
        .iter()
        .map(|s| Line::from(s.to_string()))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Company Data Extractor "),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    app.state.draw(app.current_id(), f, chunks[1]);

    f.render_widget(status_bar(&app.status), chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_missing_keys(f: &mut Frame, missing: &[String]) {
    let area = centered_rect(70, 50, f.area());

    let mut lines = vec![
        Line::from("Missing required environment variables")
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
    ];
    lines.extend(missing.iter().map(|name| Line::from(format!("  • {name}"))));
    lines.push(Line::from(""));
    lines.push(Line::from(
        "Set them in your shell or a .env file in the working directory, then restart.",
    ));
    lines.push(Line::from(""));
    lines.push(Line::from("Press q to quit.").style(Style::default().fg(Color::DarkGray)));

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Configuration required ")
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, area);
    f.render_widget(panel, area);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-2          Switch to screen"),
        Line::from("  Tab          Next screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Extract:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Edit name / run extraction"),
        Line::from("  Esc          Stop editing"),
        Line::from(""),
        Line::from("History:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ or j/k   Select company"),
        Line::from("  r            Reload from database"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (any key closes) ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(r);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);

    center
}
