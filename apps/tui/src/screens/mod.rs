//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and encapsulates its
//! own state and rendering logic. Work that needs the pipeline is handed
//! back to the event loop as an [`Action`].

mod extract;
mod history;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;

pub(crate) use extract::{ExtractScreen, RECENT_LIMIT};
pub(crate) use history::{HISTORY_LIMIT, HistoryScreen};

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Extract,
    History,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extract => write!(f, "Extract"),
            Self::History => write!(f, "History"),
        }
    }
}

/// Work requested by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    /// Run the pipeline for this (untrimmed) name.
    Extract(String),
    RefreshHistory,
}

/// State for every screen.
pub(crate) struct Screens {
    pub extract: ExtractScreen,
    pub history: HistoryScreen,
}

impl Screens {
    pub(crate) fn new() -> Self {
        Self {
            extract: ExtractScreen::new(),
            history: HistoryScreen::new(),
        }
    }

    /// Whether the given screen has an active text input field.
    pub(crate) fn is_editing(&self, id: ScreenId) -> bool {
        match id {
            ScreenId::Extract => self.extract.is_editing(),
            ScreenId::History => false,
        }
    }

    pub(crate) fn draw(&self, id: ScreenId, f: &mut Frame, area: Rect) {
        match id {
            ScreenId::Extract => self.extract.draw(f, area),
            ScreenId::History => self.history.draw(f, area),
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        id: ScreenId,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Action {
        match id {
            ScreenId::Extract => self.extract.handle_key(code, modifiers),
            ScreenId::History => self.history.handle_key(code, modifiers),
        }
    }
}
