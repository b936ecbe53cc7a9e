//! Transient notifications in the top-right corner, plus one persistent
//! spinner line for the request in flight.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

pub const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn color(self) -> Color {
        match self {
            Self::Info => C_TOAST_INFO,
            Self::Success => C_TOAST_SUCCESS,
            Self::Warning => C_TOAST_WARNING,
            Self::Error => C_TOAST_ERROR,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    spinner: Option<(String, usize)>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
            max_visible: 4,
        }
    }

    /// Same message twice only shows once; the newer one wins.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let message = message.into();
        self.toasts.retain(|t| t.message != message);
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: Instant::now() + duration,
        });
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(4));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(6));
    }

    /// Start or replace the spinner line. It stays until resolved.
    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some((message.into(), 0));
    }

    pub fn dismiss_spinner(&mut self) {
        self.spinner = None;
    }

    pub fn spinner_message(&self) -> Option<&str> {
        self.spinner.as_ref().map(|(m, _)| m.as_str())
    }

    /// Drop expired toasts and advance the spinner. Returns true if anything
    /// on screen changed.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires > now);
        let mut changed = self.toasts.len() != before;
        if let Some((_, frame)) = self.spinner.as_mut() {
            *frame = (*frame + 1) % SPINNER_FRAMES.len();
            changed = true;
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            return;
        }
        let max_width = (area.width / 2).clamp(24, 60);
        let mut y = area.y + 1;

        let spinner_line = self.spinner.as_ref().map(|(message, i)| {
            (
                format!(" {} {} ", SPINNER_FRAMES[*i % SPINNER_FRAMES.len()], message),
                C_TOAST_INFO,
            )
        });
        let toast_lines = self
            .toasts
            .iter()
            .rev()
            .map(|t| (format!(" {} {} ", t.severity.icon(), t.message), t.severity.color()));

        for (text, color) in spinner_line.into_iter().chain(toast_lines) {
            if y >= area.bottom() {
                break;
            }
            let w = (text.width() as u16).min(max_width).min(area.width);
            let rect = Rect {
                x: area.right().saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))),
                rect,
            );
            y += 1;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_and_queue_is_capped() {
        let mut t = ToastManager::new();
        t.info("a");
        t.info("a");
        assert_eq!(t.len(), 1);
        for m in ["b", "c", "d", "e", "f"] {
            t.info(m);
        }
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn expired_toasts_are_dropped_on_tick() {
        let mut t = ToastManager::new();
        t.push("gone", Severity::Info, Duration::ZERO);
        assert!(t.tick());
        assert!(t.is_empty());
    }

    #[test]
    fn spinner_survives_ticks_until_dismissed() {
        let mut t = ToastManager::new();
        t.spinner("Creating…");
        t.tick();
        t.tick();
        assert_eq!(t.spinner_message(), Some("Creating…"));
        t.dismiss_spinner();
        assert!(t.is_empty());
    }
}
