//! "Extract" screen: company name input, last result, recent rows.

use companyscout_shared::{CompanyRecord, ExtractionOutcome, pretty_analysis};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::Action;

/// Rows shown under "Previously processed".
pub(crate) const RECENT_LIMIT: u32 = 5;

/// What the result panel is showing.
enum Panel {
    Idle,
    Processing(String),
    Finished(ExtractionOutcome),
}

pub(crate) struct ExtractScreen {
    input: String,
    editing: bool,
    panel: Panel,
    recent: Vec<CompanyRecord>,
    total: u64,
}

impl ExtractScreen {
    pub(crate) fn new() -> Self {
        Self {
            input: String::new(),
            editing: true,
            panel: Panel::Idle,
            recent: Vec::new(),
            total: 0,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn set_processing(&mut self, company_name: &str) {
        self.panel = Panel::Processing(company_name.trim().to_string());
    }

    pub(crate) fn set_outcome(&mut self, outcome: ExtractionOutcome) {
        if outcome.is_success() {
            self.input.clear();
        }
        self.panel = Panel::Finished(outcome);
    }

    pub(crate) fn set_recent(&mut self, recent: Vec<CompanyRecord>, total: u64) {
        self.recent = recent;
        self.total = total;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let recent_height = RECENT_LIMIT as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),             // Input
                Constraint::Length(1),             // Hint
                Constraint::Min(5),                // Result
                Constraint::Length(recent_height), // Recent rows
            ])
            .split(area);

        let input_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let input = Paragraph::new(self.input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Company name ")
                .border_style(input_style),
        );
        f.render_widget(input, chunks[0]);

        let hint = if self.editing {
            "Type a name · Enter to extract · Esc to stop editing"
        } else {
            "Enter to edit · Tab to switch screens · q to quit"
        };
        f.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[1],
        );

        let result = Paragraph::new(self.result_lines())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Result "));
        f.render_widget(result, chunks[2]);

        let items: Vec<ListItem> = self
            .recent
            .iter()
            .map(|r| ListItem::new(format!("{} - {}", r.company_name, r.domain)))
            .collect();
        let recent = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Previously processed ({} companies) ", self.total)),
        );
        f.render_widget(recent, chunks[3]);
    }

    fn result_lines(&self) -> Vec<Line<'_>> {
        match &self.panel {
            Panel::Idle => vec![Line::from("Enter a company name to begin.")
                .style(Style::default().fg(Color::DarkGray))],
            Panel::Processing(name) => vec![Line::from(format!("Processing {name}..."))
                .style(Style::default().fg(Color::Yellow))],
            Panel::Finished(ExtractionOutcome::Failure { error, .. }) => {
                vec![Line::from(format!("Error: {error}")).style(Style::default().fg(Color::Red))]
            }
            Panel::Finished(ExtractionOutcome::Success { data, .. }) => {
                let bold = Style::default().add_modifier(Modifier::BOLD);
                let mut lines = vec![
                    Line::from("Data extracted successfully!").style(Style::default().fg(Color::Green)),
                    Line::from(""),
                    Line::from(vec![Span::styled("Company:  ", bold), Span::raw(data.company_name.as_str())]),
                    Line::from(vec![Span::styled("Domain:   ", bold), Span::raw(data.domain.as_str())]),
                    Line::from(vec![
                        Span::styled("LinkedIn: ", bold),
                        Span::raw(data.linkedin_url.as_deref().unwrap_or("Not found")),
                    ]),
                    Line::from(""),
                    Line::from("Analysis").style(bold),
                ];
                lines.extend(
                    pretty_analysis(&data.analysis)
                        .lines()
                        .map(|l| Line::from(l.to_string())),
                );
                lines
            }
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if !self.editing {
            if code == KeyCode::Enter {
                self.editing = true;
            }
            return Action::None;
        }

        match code {
            KeyCode::Esc => self.editing = false,
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Enter => return Action::Extract(self.input.clone()),
            _ => {}
        }
        Action::None
    }
}
