//! App: component-based event loop.
//!
//! - `App` owns the components, the `AppState` they read, and a handle to
//!   the shared `PlaylistStore`.
//! - Terminal input, store change notifications and finished store intents
//!   all arrive as `AppMessage`s on one mpsc channel.
//! - Components answer input with `Vec<Action>`; the App applies them.
//! - Store intents run on spawned tasks so the UI keeps drawing while a
//!   request is in flight.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use playlist_proto::config::UiConfig;
use playlist_proto::{Completion, Outcome, PlaylistApi, PlaylistStore};

use crate::{
    action::{Action, Mutation},
    app_state::AppState,
    component::Component,
    components::{
        confirm_dialog::ConfirmDialog, form_dialog::FormDialog, header::Header,
        help_overlay::HelpOverlay, playlist_grid::PlaylistGrid,
    },
    dialog::{DialogKind, Finish, Ticket},
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::{Severity, ToastManager},
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    /// The store announced a change; re-read its snapshot.
    StoreChanged,
    Refreshed(Completion),
    /// Carries the intent's own error text, not a later read of the store.
    MutationFinished(Ticket, Completion),
}

pub struct App<A> {
    store: Arc<PlaylistStore<A>>,
    state: AppState,

    header: Header,
    grid: PlaylistGrid,
    form: FormDialog,
    confirm: ConfirmDialog,
    help: HelpOverlay,
    toast: ToastManager,

    grid_area: Rect,
    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
    should_quit: bool,
}

impl<A: PlaylistApi + 'static> App<A> {
    pub fn new(store: Arc<PlaylistStore<A>>, ui: &UiConfig) -> Self {
        let (tx, rx) = mpsc::channel(256);
        Self {
            store,
            state: AppState::default(),
            header: Header::new(),
            grid: PlaylistGrid::new(),
            form: FormDialog::new(ui.confirm_destructive),
            confirm: ConfirmDialog::new(ui.confirm_destructive),
            help: HelpOverlay::new(),
            toast: ToastManager::new(),
            grid_area: Rect::default(),
            tx,
            rx: Some(rx),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        let Some(rx) = self.rx.take() else {
            anyhow::bail!("App::run called twice");
        };

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("run(): terminal ready, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut rx: mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: store notifications ──────────────────────────────
        let store_tx = self.tx.clone();
        let mut events = self.store.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!("store events lagged by {}", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                if store_tx.send(AppMessage::StoreChanged).await.is_err() {
                    break;
                }
            }
        });

        info!("loading playlists");
        self.spawn_refresh();

        // Toast expiry, spinner frames.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 64;
                    let mut redraw = self.handle_message(msg).await;
                    let mut store_changed = false;
                    for _ in 0..MAX_DRAIN {
                        match rx.try_recv() {
                            // Many notifications collapse into one snapshot read.
                            Ok(AppMessage::StoreChanged) => store_changed = true,
                            Ok(other) => redraw |= self.handle_message(other).await,
                            Err(_) => break,
                        }
                    }
                    if store_changed {
                        redraw |= self.handle_message(AppMessage::StoreChanged).await;
                    }
                    needs_redraw = redraw;
                }

                _ = ui_tick.tick() => {
                    let mut actions = self.header.tick(&self.state);
                    actions.extend(self.grid.tick(&self.state));
                    for action in actions {
                        self.dispatch(action).await;
                    }
                    needs_redraw = self.toast.tick() || self.state.is_loading();
                }
            }
        }
        Ok(())
    }

    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action).await;
                }
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                let actions = self.handle_mouse(mouse);
                let redraw = !actions.is_empty()
                    || matches!(
                        mouse.kind,
                        MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
                    );
                for action in actions {
                    self.dispatch(action).await;
                }
                redraw
            }
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,
            AppMessage::StoreChanged => {
                self.state.snapshot = self.store.snapshot().await;
                self.grid.sync(&self.state);
                true
            }
            AppMessage::Refreshed(completion) => {
                if completion == Outcome::Failed {
                    self.toast.error(format!(
                        "could not load playlists: {}",
                        completion.error.as_deref().unwrap_or("unknown error")
                    ));
                }
                true
            }
            AppMessage::MutationFinished(ticket, completion) => {
                self.on_mutation_finished(ticket, completion);
                true
            }
        }
    }

    fn on_mutation_finished(&mut self, ticket: Ticket, completion: Completion) {
        let Completion { outcome, error } = completion.clone();
        let finish = match ticket.kind {
            DialogKind::Create | DialogKind::Edit => self.form.finish(ticket, outcome, error),
            DialogKind::Delete => self.confirm.finish(ticket, outcome, error),
        };
        debug!("{:?} finished: {:?} -> {:?}", ticket.kind, outcome, finish);

        if self.toast.spinner_message() == Some(ticket.kind.busy_label()) {
            self.toast.dismiss_spinner();
        }
        match mutation_notice(ticket.kind, finish, &completion) {
            Some((Severity::Success, message)) => self.toast.success(message),
            Some((Severity::Error, message)) => self.toast.error(message),
            Some((Severity::Warning, message)) => self.toast.warning(message),
            Some((Severity::Info, message)) => self.toast.info(message),
            None => {}
        }
        self.sync_input_mode();
    }

    // ── Keyboard handling ─────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Modal layers take every key, topmost first.
        let s = &self.state;
        if self.help.visible {
            return self.help.handle_key(key, s);
        }
        if self.confirm.is_open() {
            return self.confirm.handle_key(key, s);
        }
        if self.form.is_open() {
            return self.form.handle_key(key, s);
        }
        if self.grid.is_searching() {
            return self.grid.handle_key(key, s);
        }

        match key.code {
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => vec![Action::Quit],
            KeyCode::Char('?') => vec![Action::ToggleHelp],
            KeyCode::Char('n') => vec![Action::OpenCreate],
            KeyCode::Char('r') => vec![Action::Refresh],
            KeyCode::Char('x') => vec![Action::DismissError],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::NextGenre],
            KeyCode::Left | KeyCode::Char('h') => vec![Action::PrevGenre],
            _ => self.grid.handle_key(key, s),
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if self.help.visible || self.form.is_open() || self.confirm.is_open() {
            return vec![];
        }
        let area = self.grid_area;
        let inside = area.width > 0
            && area.height > 0
            && event.column >= area.x
            && event.column < area.right()
            && event.row >= area.y
            && event.row < area.bottom();
        if !inside {
            return vec![];
        }
        self.grid.handle_mouse(event, area, &self.state)
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.header.on_action(&action, s));
            out.extend(self.grid.on_action(&action, s));
            out.extend(self.form.on_action(&action, s));
            out.extend(self.confirm.on_action(&action, s));
            out.extend(self.help.on_action(&action, s));
            out
        };

        self.apply_action(action).await;

        for a in secondary {
            self.apply_action(a).await;
        }
    }

    async fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Collection ────────────────────────────────────────────────────
            Action::Refresh => self.spawn_refresh(),
            Action::Submit(ticket, mutation) => self.spawn_mutation(ticket, mutation),
            Action::DismissError => self.store.clear_error().await,

            // ── Dialogs / modes ───────────────────────────────────────────────
            Action::OpenCreate
            | Action::OpenEdit(_)
            | Action::OpenDelete(_)
            | Action::DialogClosed
            | Action::OpenSearch
            | Action::CloseSearch => self.sync_input_mode(),

            // ── Search / genre ────────────────────────────────────────────────
            Action::QueryChanged(query) => {
                self.state.query = query;
                self.grid.sync(&self.state);
            }
            Action::NextGenre => {
                self.state.genre = self.state.genre.next();
                self.grid.sync(&self.state);
            }
            Action::PrevGenre => {
                self.state.genre = self.state.genre.prev();
                self.grid.sync(&self.state);
            }

            // ── UI ────────────────────────────────────────────────────────────
            Action::ToggleHelp => {}
            Action::Notify(message) => self.toast.warning(message),
            Action::Quit => self.should_quit = true,
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }
        }
    }

    fn spawn_refresh(&self) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let completion = store.refresh().await;
            let _ = tx.send(AppMessage::Refreshed(completion)).await;
        });
    }

    fn spawn_mutation(&mut self, ticket: Ticket, mutation: Mutation) {
        self.toast.spinner(ticket.kind.busy_label());
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let completion = match &mutation {
                Mutation::Create(draft) => store.create(draft).await,
                Mutation::Update(record, draft) => store.update(record, draft).await,
                Mutation::Delete(record) => store.remove(record).await,
            };
            let _ = tx.send(AppMessage::MutationFinished(ticket, completion)).await;
        });
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.form.is_open() || self.confirm.is_open() {
            InputMode::Dialog
        } else if self.grid.is_searching() {
            InputMode::Search
        } else {
            InputMode::Normal
        };
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let banner_height = u16::from(self.state.last_error().is_some());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banner_height),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let modal = self.form.is_open() || self.confirm.is_open() || self.help.visible;
        let s = &self.state;
        self.header.draw(frame, chunks[0], false, s);
        if let Some(message) = s.last_error() {
            status_bar::draw_error_banner(frame, chunks[1], message);
        }
        self.grid_area = chunks[2];
        self.grid.draw(frame, chunks[2], !modal, s);
        status_bar::draw_keys_bar(frame, chunks[3], s.input_mode);

        self.form.draw(frame, area, true, s);
        self.confirm.draw(frame, area, true, s);
        self.help.draw(frame, area, true, s);
        self.toast.draw(frame, area);
    }
}

/// Toast for a finished mutation. `None` when the dialog is still open and
/// already shows the result inline.
fn mutation_notice(
    kind: DialogKind,
    finish: Finish,
    completion: &Completion,
) -> Option<(Severity, String)> {
    match (finish, completion.outcome) {
        (Finish::Reopened, _) => None,
        (_, Outcome::Done) => Some((Severity::Success, kind.done_message().to_string())),
        // The dialog is gone, so the toast is the only place left to say it.
        (_, Outcome::Failed) => Some((
            Severity::Error,
            completion
                .error
                .clone()
                .unwrap_or_else(|| format!("{} failed", kind.busy_label())),
        )),
        (_, Outcome::Skipped) => Some((Severity::Warning, "fill in every field first".to_string())),
    }
}
