//! "History" screen: every stored company with its analysis.

use companyscout_shared::{CompanyRecord, pretty_analysis};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::Action;

/// Newest rows loaded into the History tab.
pub(crate) const HISTORY_LIMIT: u32 = 200;

pub(crate) struct HistoryScreen {
    entries: Vec<CompanyRecord>,
    selected: usize,
    status: String,
}

impl HistoryScreen {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
            status: "Press 'r' to refresh.".to_string(),
        }
    }

    /// Replace the list with the newest rows; `total` is the full row count.
    pub(crate) fn set_entries(&mut self, entries: Vec<CompanyRecord>, total: u64) {
        self.status = if total > entries.len() as u64 {
            format!("Showing newest {} of {total} stored companies.", entries.len())
        } else {
            format!("{total} stored companies.")
        };
        self.entries = entries;
        self.selected = 0;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // List + detail
                Constraint::Length(1), // Status
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[0]);

        if self.entries.is_empty() {
            let empty = Paragraph::new(
                "No companies stored yet.\n\nUse the 'Extract' tab to research one.",
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Companies "));
            f.render_widget(empty, rows[0]);
        } else {
            let items: Vec<ListItem> = self
                .entries
                .iter()
                .map(|record| ListItem::new(format!("#{} {}", record.id, record.company_name)))
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" Companies ({}) ", self.entries.len())),
                )
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▸ ");
            // Rebuilt each frame; ratatui scrolls the offset to the selection.
            let mut state = ListState::default().with_selected(Some(self.selected));
            f.render_stateful_widget(list, columns[0], &mut state);

            if let Some(record) = self.entries.get(self.selected) {
                f.render_widget(detail(record), columns[1]);
            }
        }

        let status = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(status, rows[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('r') => return Action::RefreshHistory,
            _ => {}
        }
        Action::None
    }
}

fn detail(record: &CompanyRecord) -> Paragraph<'_> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let stored = record
        .stored_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".into());

    let mut lines = vec![
        Line::from(vec![Span::styled("Domain:   ", bold), Span::raw(record.domain.as_str())]),
        Line::from(vec![
            Span::styled("LinkedIn: ", bold),
            Span::raw(record.linkedin_url.as_deref().unwrap_or("Not found")),
        ]),
        Line::from(vec![Span::styled("Stored:   ", bold), Span::raw(stored)]),
        Line::from(""),
    ];
    lines.extend(
        pretty_analysis(&record.analysis)
            .lines()
            .map(|l| Line::from(l.to_string())),
    );

    Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", record.company_name)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn records(count: i64) -> Vec<CompanyRecord> {
        (1..=count)
            .map(|id| CompanyRecord {
                id,
                company_name: format!("Company {id}"),
                domain: format!("https://company{id}.com"),
                linkedin_url: None,
                analysis: "{}".into(),
                timestamp: id as f64,
            })
            .collect()
    }

    fn rendered(screen: &HistoryScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| screen.draw(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn selection_stays_visible_past_the_fold() {
        let mut screen = HistoryScreen::new();
        screen.set_entries(records(30), 30);
        assert!(!rendered(&screen).contains("#30 "));

        for _ in 0..29 {
            screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        }
        assert_eq!(screen.selected, 29);
        assert!(rendered(&screen).contains("#30 "));

        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(screen.selected, 29);
    }

    #[test]
    fn status_reports_truncated_history() {
        let mut screen = HistoryScreen::new();
        screen.set_entries(records(3), 3);
        assert_eq!(screen.status, "3 stored companies.");

        screen.set_entries(records(2), 250);
        assert_eq!(screen.status, "Showing newest 2 of 250 stored companies.");
        assert_eq!(screen.entries.len(), 2);
    }
}
