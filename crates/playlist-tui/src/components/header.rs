//! Header: app title, loading spinner, record counts and the genre selector.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use playlist_proto::{Genre, GenreFilter};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{genre_color, style_bold, style_muted, style_secondary, C_ACCENT, C_BUSY, C_PRIMARY},
    widgets::toast::SPINNER_FRAMES,
};

pub struct Header {
    frame: usize,
}

impl Header {
    pub fn new() -> Self {
        Self { frame: 0 }
    }

    fn genre_spans(state: &AppState) -> Vec<Span<'static>> {
        let mut options = vec![GenreFilter::All];
        options.extend(Genre::KNOWN.iter().cloned().map(GenreFilter::Only));
        // A selected genre outside the known list still gets shown.
        if !options.contains(&state.genre) {
            options.push(state.genre.clone());
        }

        let mut spans = vec![Span::styled("genre ", style_muted())];
        for option in options {
            let label = option.label().to_string();
            let active = option == state.genre;
            let color = match &option {
                GenreFilter::All => C_PRIMARY,
                GenreFilter::Only(g) => genre_color(g),
            };
            if active {
                spans.push(Span::styled(
                    format!("[{}]", label),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(format!(" {} ", label), style_muted()));
            }
        }
        spans
    }
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn tick(&mut self, state: &AppState) -> Vec<Action> {
        if state.is_loading() {
            self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
        }
        Vec::new()
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let total = state.records().len();
        let shown = state.visible_indices().len();

        let mut spans = vec![
            Span::styled(" ▶ ", style_bold(C_ACCENT)),
            Span::styled("playlists", style_bold(C_PRIMARY)),
            Span::raw("  "),
        ];
        if state.is_loading() {
            spans.push(Span::styled(
                format!("{} loading ", SPINNER_FRAMES[self.frame]),
                Style::default().fg(C_BUSY),
            ));
        } else {
            spans.push(Span::raw("          "));
        }
        let counts = if shown == total {
            format!("{} playlists", total)
        } else {
            format!("{} of {} playlists", shown, total)
        };
        spans.push(Span::styled(counts, style_secondary()));
        spans.push(Span::raw("   "));
        spans.extend(Self::genre_spans(state));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_only_turns_while_loading() {
        let mut header = Header::new();
        let mut state = AppState::default();
        header.tick(&state);
        assert_eq!(header.frame, 0);
        state.snapshot.is_loading = true;
        header.tick(&state);
        header.tick(&state);
        assert_eq!(header.frame, 2);
    }

    #[test]
    fn unknown_selected_genre_is_listed() {
        let mut state = AppState::default();
        state.genre = GenreFilter::parse("podcast");
        let text: String = Header::genre_spans(&state)
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert!(text.contains("[podcast]"));
        assert!(text.contains(" music "));
    }
}
