//! PlaylistGrid: the main pane: search bar plus one card per visible record.

use std::time::Instant;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthChar;

use playlist_proto::{GenreFilter, PlaylistRecord};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        genre_color, style_bold, style_muted, style_secondary, C_BUSY, C_ERROR, C_LINK, C_MUTED,
        C_OK, C_PRIMARY, C_SELECTION_BG,
    },
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

/// Rows per card, including the blank spacer.
const CARD_ROWS: u16 = 5;

pub struct PlaylistGrid {
    list: ScrollableList<PlaylistRecord>,
    search: FilterInput,
    last_click: Option<(usize, Instant)>,
}

impl PlaylistGrid {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            search: FilterInput::default(),
            last_click: None,
        }
    }

    /// Pull records and the current view out of `state`.
    pub fn sync(&mut self, state: &AppState) {
        self.list
            .set_items(state.records().to_vec(), state.visible_indices());
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<&PlaylistRecord> {
        self.list.selected_item()
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_active()
    }

    fn card<'a>(&self, record: &'a PlaylistRecord, selected: bool, width: u16) -> Vec<Line<'a>> {
        let body = width.saturating_sub(4) as usize;
        let bar = if selected {
            Span::styled("▌ ", style_bold(C_PRIMARY))
        } else {
            Span::raw("  ")
        };
        let title_style = if selected {
            style_bold(C_PRIMARY)
        } else {
            Style::default().fg(C_PRIMARY)
        };
        let genre = format!("[{}]", record.genre);
        let title_room = body.saturating_sub(genre.chars().count() + 2);

        let mut title_line = vec![
            bar,
            Span::styled(truncate(&record.title, title_room), title_style),
            Span::raw("  "),
            Span::styled(genre, Style::default().fg(genre_color(&record.genre))),
        ];
        if record.id.is_none() {
            title_line.push(Span::styled("  no id", Style::default().fg(C_ERROR)));
        }

        let thumbnail = if record.thumbnail.trim().is_empty() {
            Span::styled("no image", style_muted())
        } else {
            Span::styled(
                truncate(&record.thumbnail, body.saturating_sub(24)),
                style_secondary(),
            )
        };
        let mut meta_line = vec![Span::raw("  "), Span::styled("▣ ", style_muted()), thumbnail];
        if let Some(created) = record.created_at.as_deref() {
            meta_line.push(Span::styled(
                format!("  · {}", format_created(created)),
                style_muted(),
            ));
        }

        let lines = vec![
            Line::from(title_line),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(truncate(&record.description, body), style_secondary()),
            ]),
            Line::from(vec![
                Span::raw("  "),
                Span::styled("↗ ", style_muted()),
                Span::styled(truncate(&record.url, body.saturating_sub(2)), Style::default().fg(C_LINK)),
            ]),
            Line::from(meta_line),
        ];
        if selected {
            lines
                .into_iter()
                .map(|l| l.style(Style::default().bg(C_SELECTION_BG)))
                .collect()
        } else {
            lines
        }
    }

    fn empty_message(state: &AppState, filtered: bool) -> &'static str {
        if state.records().is_empty() && state.is_loading() {
            "  loading playlists…"
        } else if state.records().is_empty() {
            "  no playlists yet, press n to create one"
        } else if filtered {
            "  no playlists match the search"
        } else {
            ""
        }
    }
}

impl Component for PlaylistGrid {
    fn id(&self) -> ComponentId {
        ComponentId::PlaylistGrid
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        if self.search.is_active() {
            match key.code {
                KeyCode::Up => {
                    self.list.select_up(1);
                    return vec![];
                }
                KeyCode::Down => {
                    self.list.select_down(1);
                    return vec![];
                }
                _ => {}
            }
            return match self.search.handle_key(key) {
                FilterAction::Changed(q) => vec![Action::QueryChanged(q)],
                FilterAction::Confirmed | FilterAction::Cancelled => vec![Action::CloseSearch],
                FilterAction::None => vec![],
            };
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),

            KeyCode::Char('/') => {
                self.search.activate();
                return vec![Action::OpenSearch];
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(record) = self.list.selected_item() {
                    return vec![Action::OpenEdit(record.clone())];
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(record) = self.list.selected_item() {
                    return vec![Action::OpenDelete(record.clone())];
                }
            }
            KeyCode::Char('o') | KeyCode::Char('y') => {
                if let Some(record) = self.list.selected_item() {
                    if record.url.trim().is_empty() {
                        return vec![Action::Notify("this playlist has no url".into())];
                    }
                    return vec![Action::CopyToClipboard(record.url.trim().to_string())];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        // Border plus the search row sit above the first card.
        let rel_row = event.row.saturating_sub(area.y + 2) as usize;
        let card = rel_row / CARD_ROWS as usize;
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let is_double = self
                    .last_click
                    .map(|(c, t)| c == card && t.elapsed().as_millis() < 400)
                    .unwrap_or(false);
                if self.list.handle_click(card) && is_double {
                    self.last_click = None;
                    if let Some(record) = self.list.selected_item() {
                        return vec![Action::OpenEdit(record.clone())];
                    }
                } else {
                    self.last_click = Some((card, Instant::now()));
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::CloseSearch = action {
            self.search.deactivate();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = if state.is_loading() {
            Badge {
                text: "LOADING".into(),
                color: C_BUSY,
            }
        } else if state.last_error().is_some() {
            Badge {
                text: "ERR".into(),
                color: C_ERROR,
            }
        } else {
            Badge {
                text: format!("{}/{}", self.list.len(), self.list.total_len()),
                color: C_OK,
            }
        };
        let block = pane_chrome("playlists", focused, Some(badge));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        self.search.draw(frame, rows[0]);
        let cards_area = rows[1];

        if self.list.is_empty() {
            let filtered = !state.query.is_empty() || state.genre != GenreFilter::All;
            frame.render_widget(
                Paragraph::new(Span::styled(
                    Self::empty_message(state, filtered),
                    Style::default().fg(C_MUTED),
                )),
                cards_area,
            );
            return;
        }

        let slots = (cards_area.height / CARD_ROWS).max(1) as usize;
        self.list.ensure_visible(slots);
        let selected = self.list.selected_original_index();

        let mut lines: Vec<Line> = Vec::new();
        for (idx, record) in self.list.visible_items(slots) {
            lines.extend(self.card(record, Some(idx) == selected, cards_area.width));
            lines.push(Line::from(""));
        }
        frame.render_widget(Paragraph::new(lines), cards_area);
    }
}

/// Cut `text` to at most `width` columns, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            if width > 0 {
                while used + 1 > width {
                    match out.pop() {
                        Some(c) => used -= c.width().unwrap_or(0),
                        None => break,
                    }
                }
                out.push('…');
            }
            return out;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// `2024-05-01T10:00:00Z` and `2024-05-01` both show as `2024-05-01`;
/// anything else is shown as sent.
pub fn format_created(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_proto::{Genre, PlaylistId};

    fn record(id: &str, title: &str, url: &str) -> PlaylistRecord {
        PlaylistRecord {
            id: Some(PlaylistId::new(id)),
            title: title.to_string(),
            url: url.to_string(),
            genre: Genre::Music,
            ..Default::default()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        let mut state = AppState::default();
        state.snapshot.records = vec![
            record("1", "Lo-fi Beats", "https://youtu.be/a"),
            record("2", "React Tutorial", " "),
        ];
        state
    }

    #[test]
    fn edit_and_delete_carry_the_selected_record() {
        let state = state();
        let mut grid = PlaylistGrid::new();
        grid.sync(&state);
        grid.handle_key(key(KeyCode::Char('j')), &state);

        match grid.handle_key(key(KeyCode::Char('e')), &state).as_slice() {
            [Action::OpenEdit(r)] => assert_eq!(r.title, "React Tutorial"),
            other => panic!("unexpected {:?}", other),
        }
        match grid.handle_key(key(KeyCode::Char('d')), &state).as_slice() {
            [Action::OpenDelete(r)] => assert_eq!(r.id, Some(PlaylistId::new("2"))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn copy_url_needs_a_url() {
        let state = state();
        let mut grid = PlaylistGrid::new();
        grid.sync(&state);
        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('o')), &state).as_slice(),
            [Action::CopyToClipboard(u)] if u == "https://youtu.be/a"
        ));
        grid.handle_key(key(KeyCode::Down), &state);
        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('o')), &state).as_slice(),
            [Action::Notify(_)]
        ));
    }

    #[test]
    fn search_typing_emits_query_changes() {
        let state = state();
        let mut grid = PlaylistGrid::new();
        grid.sync(&state);
        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('/')), &state).as_slice(),
            [Action::OpenSearch]
        ));
        assert!(grid.is_searching());
        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('r')), &state).as_slice(),
            [Action::QueryChanged(q)] if q == "r"
        ));
        // Letters go to the search bar, not to the shortcuts.
        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('e')), &state).as_slice(),
            [Action::QueryChanged(q)] if q == "re"
        ));
    }

    #[test]
    fn selection_survives_a_narrower_view() {
        let mut state = state();
        let mut grid = PlaylistGrid::new();
        grid.sync(&state);
        grid.handle_key(key(KeyCode::Down), &state);
        state.query = "react".into();
        grid.sync(&state);
        assert_eq!(grid.selected().map(|r| r.title.as_str()), Some("React Tutorial"));
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("日本語のタイトル", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn created_dates_are_shortened() {
        assert_eq!(format_created("2024-05-01T10:00:00Z"), "2024-05-01");
        assert_eq!(format_created("2024-05-01 10:00:00"), "2024-05-01");
        assert_eq!(format_created("2024-05-01"), "2024-05-01");
        assert_eq!(format_created("yesterday"), "yesterday");
    }
}
