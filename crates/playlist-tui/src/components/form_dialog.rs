//! FormDialog: create and edit a playlist.
//!
//! Submit stays disabled until every required field has text. Edits go
//! through a confirmation step when `ui.confirm_destructive` is on.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use playlist_proto::{Field, Genre, PlaylistDraft, PlaylistRecord};

use crate::{
    action::{Action, ComponentId, Mutation},
    app_state::AppState,
    component::Component,
    components::centered_rect,
    dialog::{DialogKind, DialogMachine, Finish, Phase, Submit, Ticket},
    theme::{
        genre_color, style_bold, style_muted, style_secondary, C_BUSY, C_ERROR,
        C_PANEL_BORDER_FOCUSED, C_POPUP_BG, C_PRIMARY,
    },
};

const LABEL_WIDTH: usize = 13;
/// Text fields first, then the genre selector.
const GENRE_ROW: usize = Field::REQUIRED.len();

pub struct FormDialog {
    machine: DialogMachine,
    inputs: [Input; GENRE_ROW],
    genre: Genre,
    focus: usize,
    editing: Option<PlaylistRecord>,
    confirm_edits: bool,
}

impl FormDialog {
    pub fn new(confirm_edits: bool) -> Self {
        Self {
            machine: DialogMachine::new(DialogKind::Create, false),
            inputs: Default::default(),
            genre: Genre::default(),
            focus: 0,
            editing: None,
            confirm_edits,
        }
    }

    pub fn open_create(&mut self) {
        self.fill(&PlaylistDraft::default());
        self.editing = None;
        self.machine.open_as(DialogKind::Create, false);
    }

    pub fn open_edit(&mut self, record: PlaylistRecord) {
        self.fill(&PlaylistDraft::from_record(&record));
        self.editing = Some(record);
        self.machine.open_as(DialogKind::Edit, self.confirm_edits);
    }

    pub fn close(&mut self) {
        self.machine.close();
        self.editing = None;
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

    pub fn finish(
        &mut self,
        ticket: Ticket,
        outcome: playlist_proto::Outcome,
        error: Option<String>,
    ) -> Finish {
        let result = self.machine.finish(ticket, outcome, error);
        if result == Finish::Closed {
            self.editing = None;
        }
        result
    }

    pub fn draft(&self) -> PlaylistDraft {
        let mut draft = PlaylistDraft {
            genre: self.genre.clone(),
            ..Default::default()
        };
        for (field, input) in Field::REQUIRED.iter().zip(&self.inputs) {
            *draft.field_mut(*field) = input.value().to_string();
        }
        draft
    }

    fn fill(&mut self, draft: &PlaylistDraft) {
        for (field, input) in Field::REQUIRED.iter().zip(self.inputs.iter_mut()) {
            *input = Input::new(draft.field(*field).to_string());
        }
        self.genre = draft.genre.clone();
        self.focus = 0;
    }

    fn submit(&mut self, state: &AppState) -> Vec<Action> {
        // One loading flag gates every mutation button.
        if state.is_loading() && self.machine.phase() == Phase::Open {
            return vec![];
        }
        let draft = self.draft();
        match self.machine.begin_submit(draft.is_complete()) {
            Submit::Started(ticket) => {
                let mutation = match &self.editing {
                    Some(record) => Mutation::Update(record.clone(), draft),
                    None => Mutation::Create(draft),
                };
                vec![Action::Submit(ticket, mutation)]
            }
            Submit::NeedsConfirm | Submit::Blocked | Submit::Busy => vec![],
        }
    }

    fn field_line(&self, row: usize, field: Field) -> Line<'static> {
        let focused = self.focus == row;
        let value = self.inputs[row].value().to_string();
        let label_style = if focused {
            style_bold(C_PRIMARY)
        } else {
            style_secondary()
        };
        let marker = if focused { "›" } else { " " };
        let body = if value.is_empty() {
            Span::styled(format!("{} required", field.label()), style_muted())
        } else {
            Span::styled(value, Style::default().fg(C_PRIMARY))
        };
        Line::from(vec![
            Span::styled(format!(" {} ", marker), style_bold(C_PANEL_BORDER_FOCUSED)),
            Span::styled(format!("{:<w$}", field.label(), w = LABEL_WIDTH), label_style),
            body,
        ])
    }

    fn genre_line(&self) -> Line<'static> {
        let focused = self.focus == GENRE_ROW;
        let label_style = if focused {
            style_bold(C_PRIMARY)
        } else {
            style_secondary()
        };
        Line::from(vec![
            Span::styled(
                format!(" {} ", if focused { "›" } else { " " }),
                style_bold(C_PANEL_BORDER_FOCUSED),
            ),
            Span::styled(format!("{:<w$}", "genre", w = LABEL_WIDTH), label_style),
            Span::styled("◂ ", style_muted()),
            Span::styled(
                self.genre.to_string(),
                Style::default()
                    .fg(genre_color(&self.genre))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ▸", style_muted()),
        ])
    }

    fn footer_lines(&self, state: &AppState) -> Vec<Line<'static>> {
        let kind = self.machine.kind();
        let verb = match kind {
            DialogKind::Edit => "save",
            _ => "create",
        };
        let mut lines = Vec::new();
        match self.machine.phase() {
            Phase::Submitting => {
                lines.push(Line::from(Span::styled(
                    format!(" {}", kind.busy_label()),
                    style_bold(C_BUSY),
                )));
            }
            Phase::PendingConfirm => {
                let title = self.inputs[0].value().trim().to_string();
                lines.push(Line::from(vec![
                    Span::styled(format!(" save changes to \"{}\"? ", title), style_bold(C_BUSY)),
                    Span::styled("Enter confirm  Esc back", style_secondary()),
                ]));
            }
            Phase::Open | Phase::Closed => {
                let missing = self.draft().missing_field();
                let enabled = missing.is_none() && !state.is_loading();
                let button = if enabled {
                    style_bold(C_PRIMARY).add_modifier(Modifier::REVERSED)
                } else {
                    style_muted()
                };
                let mut spans = vec![
                    Span::raw(" "),
                    Span::styled(format!(" Enter {} ", verb), button),
                    Span::styled("  Esc cancel", style_muted()),
                ];
                if let Some(field) = missing {
                    spans.push(Span::styled(format!("   {} is required", field), style_muted()));
                } else if state.is_loading() {
                    spans.push(Span::styled("   waiting for the server…", style_muted()));
                }
                lines.push(Line::from(spans));
            }
        }
        if let Some(error) = self.machine.error() {
            lines.push(Line::from(Span::styled(
                format!(" ✗ {}", error),
                Style::default().fg(C_ERROR),
            )));
        }
        lines
    }
}

impl Component for FormDialog {
    fn id(&self) -> ComponentId {
        ComponentId::FormDialog
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.machine.is_open() {
            return vec![];
        }

        match self.machine.phase() {
            Phase::Submitting => {
                // The request keeps running; its answer is dropped.
                if key.code == KeyCode::Esc {
                    self.close();
                    return vec![Action::DialogClosed];
                }
                return vec![];
            }
            Phase::PendingConfirm => {
                return match key.code {
                    KeyCode::Enter => self.submit(state),
                    KeyCode::Esc => {
                        self.machine.back();
                        vec![]
                    }
                    _ => vec![],
                };
            }
            Phase::Open | Phase::Closed => {}
        }

        match key.code {
            KeyCode::Esc => {
                self.close();
                return vec![Action::DialogClosed];
            }
            KeyCode::Enter => return self.submit(state),
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % (GENRE_ROW + 1),
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + GENRE_ROW) % (GENRE_ROW + 1),
            KeyCode::Right | KeyCode::Char(' ') if self.focus == GENRE_ROW => {
                self.genre = self.genre.next();
            }
            KeyCode::Left if self.focus == GENRE_ROW => {
                self.genre = self.genre.prev();
            }
            _ if self.focus < GENRE_ROW => {
                self.inputs[self.focus].handle_event(&Event::Key(key));
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::OpenCreate => self.open_create(),
            Action::OpenEdit(record) => self.open_edit(record.clone()),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !self.machine.is_open() {
            return;
        }
        let popup = centered_rect(70, 14, area);
        let title = match self.machine.kind() {
            DialogKind::Edit => " edit playlist ",
            _ => " new playlist ",
        };

        let mut lines = vec![Line::from("")];
        for (row, field) in Field::REQUIRED.iter().enumerate() {
            lines.push(self.field_line(row, *field));
        }
        lines.push(self.genre_line());
        lines.push(Line::from(""));
        lines.extend(self.footer_lines(state));

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_PANEL_BORDER_FOCUSED))
                        .title(Span::styled(title, style_bold(C_PRIMARY)))
                        .style(Style::default().bg(C_POPUP_BG)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );

        if self.focus < GENRE_ROW && self.machine.phase() == Phase::Open {
            let input = &self.inputs[self.focus];
            let x = popup.x + 1 + 3 + LABEL_WIDTH as u16 + input.visual_cursor() as u16;
            let y = popup.y + 2 + self.focus as u16;
            frame.set_cursor_position((x.min(popup.right().saturating_sub(2)), y));
        }
    }
}
