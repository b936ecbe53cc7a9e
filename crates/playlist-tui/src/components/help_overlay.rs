//! HelpOverlay: centered popup with the keyboard reference.

use ratatui::crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::centered_rect,
    theme::{C_MUTED, C_PANEL_BORDER, C_POPUP_BG, C_PRIMARY, C_SECONDARY},
};

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    /// Any key closes the overlay.
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        vec![Action::ToggleHelp]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.visible = !self.visible;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if !self.visible {
            return;
        }

        let popup = centered_rect(64, 27, area);
        let lines: Vec<Line> = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            section(" browsing"),
            help_row("↑ / ↓  or  j / k", "move selection (Shift = 5)"),
            help_row("pg up / pg dn", "jump 10 cards"),
            help_row("home / end  or  g / G", "first / last card"),
            help_row("← / →  or  h / l", "previous / next genre"),
            help_row("/", "search title and description"),
            help_row("o  or  y", "copy the playlist url"),
            help_row("r", "reload from the server"),
            help_row("x", "dismiss the error banner"),
            Line::from(""),
            section(" changing playlists"),
            help_row("n", "new playlist"),
            help_row("e  or  enter", "edit selected playlist"),
            help_row("d  or  delete", "delete selected playlist"),
            Line::from(""),
            section(" inside a dialog"),
            help_row("tab / ↑ ↓", "move between fields"),
            help_row("← / →  or  space", "change genre"),
            help_row("enter", "submit (again to confirm)"),
            help_row("esc", "back / cancel"),
            Line::from(""),
            help_row("?", "toggle this help"),
            help_row("q / Ctrl+C", "quit"),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_PANEL_BORDER))
                        .style(Style::default().bg(C_POPUP_BG)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
    ))
}

fn help_row<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<22}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}
