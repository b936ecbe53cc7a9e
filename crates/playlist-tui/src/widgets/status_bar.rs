//! Bottom keys bar and the error banner above the grid.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_ERROR, C_MODE_DIALOG, C_MODE_NORMAL, C_MODE_SEARCH, C_MUTED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    Dialog,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "BROWSE",
            Self::Search => "SEARCH",
            Self::Dialog => "DIALOG",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Search => C_MODE_SEARCH,
            Self::Dialog => C_MODE_DIALOG,
        }
    }

    fn keys(self) -> &'static str {
        match self {
            Self::Normal => {
                " ↑↓/jk select  ←→ genre  / search  n new  e edit  d delete  o copy url  r refresh  x dismiss  ? help  q quit"
            }
            Self::Search => " type to search  ↑↓ move  Enter keep  Esc clear+close",
            Self::Dialog => " Tab/↑↓ field  ←→ genre  Enter submit  Esc cancel",
        }
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(mode.keys(), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// One line, red, with a hint on how to dismiss it.
pub fn draw_error_banner(frame: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(vec![
        Span::styled(
            " ✗ ",
            Style::default().fg(C_ERROR).add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.to_string(), Style::default().fg(C_ERROR)),
        Span::styled("  (x to dismiss)", Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
