//! Search bar above the grid, backed by tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED, C_SECONDARY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Changed(String),
    /// Enter: stop editing, keep the query.
    Confirmed,
    /// Esc on an empty query: stop editing.
    Cancelled,
    None,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl FilterInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Esc clears a non-empty query first and only closes the bar on the
    /// second press.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input = Input::default();
                FilterAction::Changed(String::new())
            }
            KeyCode::Esc => {
                self.deactivate();
                FilterAction::Cancelled
            }
            KeyCode::Enter => {
                self.deactivate();
                FilterAction::Confirmed
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() == before {
                    FilterAction::None
                } else {
                    FilterAction::Changed(self.input.value().to_string())
                }
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let prefix = " search ";
        let width = area.width.saturating_sub(prefix.len() as u16 + 1) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();

        let label_style = if self.active {
            Style::default().fg(C_FILTER_FG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        let body = if value.is_empty() && !self.active {
            Span::styled(format!("/ {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            let shown: String = value.chars().skip(scroll).collect();
            Span::styled(shown, Style::default().fg(C_FILTER_FG))
        };

        let line = Line::from(vec![Span::styled(prefix, label_style), body]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if self.active {
            let cursor = self.input.visual_cursor().saturating_sub(scroll) as u16;
            let x = area.x + prefix.len() as u16 + cursor;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        }
    }
}

impl Default for FilterInput {
    fn default() -> Self {
        Self::new("search title or description…")
    }
}
