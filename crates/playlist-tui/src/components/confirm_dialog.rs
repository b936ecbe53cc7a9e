//! ConfirmDialog: delete a playlist, optionally asking twice.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use playlist_proto::{Outcome, PlaylistRecord};

use crate::{
    action::{Action, ComponentId, Mutation},
    app_state::AppState,
    component::Component,
    components::centered_rect,
    dialog::{DialogKind, DialogMachine, Finish, Phase, Submit, Ticket},
    theme::{style_bold, style_muted, style_secondary, C_ACCENT, C_BUSY, C_ERROR, C_POPUP_BG, C_PRIMARY},
};

pub struct ConfirmDialog {
    machine: DialogMachine,
    target: Option<PlaylistRecord>,
}

impl ConfirmDialog {
    pub fn new(confirm_twice: bool) -> Self {
        Self {
            machine: DialogMachine::new(DialogKind::Delete, confirm_twice),
            target: None,
        }
    }

    pub fn open(&mut self, record: PlaylistRecord) {
        self.target = Some(record);
        self.machine.open();
    }

    pub fn close(&mut self) {
        self.machine.close();
        self.target = None;
    }

    pub fn is_open(&self) -> bool {
        self.machine.is_open()
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.machine.error()
    }

    pub fn finish(&mut self, ticket: Ticket, outcome: Outcome, error: Option<String>) -> Finish {
        let result = self.machine.finish(ticket, outcome, error);
        if result == Finish::Closed {
            self.target = None;
        }
        result
    }

    fn submit(&mut self, state: &AppState) -> Vec<Action> {
        let Some(record) = self.target.clone() else {
            return vec![];
        };
        if state.is_loading() && self.machine.phase() == Phase::Open {
            return vec![];
        }
        match self.machine.begin_submit(true) {
            Submit::Started(ticket) => vec![Action::Submit(ticket, Mutation::Delete(record))],
            Submit::NeedsConfirm | Submit::Blocked | Submit::Busy => vec![],
        }
    }
}

impl Component for ConfirmDialog {
    fn id(&self) -> ComponentId {
        ComponentId::ConfirmDialog
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.machine.is_open() {
            return vec![];
        }
        match (self.machine.phase(), key.code) {
            (Phase::Submitting, KeyCode::Esc) => {
                self.close();
                vec![Action::DialogClosed]
            }
            (Phase::Submitting, _) => vec![],
            (Phase::PendingConfirm, KeyCode::Esc | KeyCode::Char('n')) => {
                self.machine.back();
                vec![]
            }
            (_, KeyCode::Enter | KeyCode::Char('y')) => self.submit(state),
            (_, KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('q')) => {
                self.close();
                vec![Action::DialogClosed]
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::OpenDelete(record) = action {
            self.open(record.clone());
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !self.machine.is_open() {
            return;
        }
        let title = self
            .target
            .as_ref()
            .map(|r| r.title.as_str())
            .unwrap_or_default();

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(" delete ", style_secondary()),
                Span::styled(format!("\"{}\"", title), style_bold(C_PRIMARY)),
                Span::styled("?", style_secondary()),
            ]),
            Line::from(Span::styled(" this cannot be undone", style_muted())),
            Line::from(""),
        ];

        match self.machine.phase() {
            Phase::Submitting => lines.push(Line::from(Span::styled(
                format!(" {}", DialogKind::Delete.busy_label()),
                style_bold(C_BUSY),
            ))),
            Phase::PendingConfirm => lines.push(Line::from(vec![
                Span::styled(" are you sure? ", style_bold(C_ACCENT)),
                Span::styled("y/Enter delete  n/Esc back", style_secondary()),
            ])),
            Phase::Open | Phase::Closed => {
                let hint = if state.is_loading() {
                    "   waiting for the server…"
                } else {
                    ""
                };
                lines.push(Line::from(vec![
                    Span::styled(" y/Enter delete  n/Esc cancel", style_secondary()),
                    Span::styled(hint, style_muted()),
                ]));
            }
        }
        if let Some(error) = self.machine.error() {
            lines.push(Line::from(Span::styled(
                format!(" ✗ {}", error),
                Style::default().fg(C_ERROR),
            )));
        }

        let popup = centered_rect(50, 9, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_ACCENT))
                        .title(Span::styled(" delete playlist ", style_bold(C_ACCENT)))
                        .style(Style::default().bg(C_POPUP_BG)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}
