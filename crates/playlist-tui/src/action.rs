//! Action enum: everything components ask the App to do.

use playlist_proto::{PlaylistDraft, PlaylistRecord};

use crate::dialog::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    PlaylistGrid,
    FormDialog,
    ConfirmDialog,
    HelpOverlay,
}

/// A store intent, ready to run.
#[derive(Debug, Clone)]
pub enum Mutation {
    Create(PlaylistDraft),
    Update(PlaylistRecord, PlaylistDraft),
    Delete(PlaylistRecord),
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Collection ───────────────────────────────────────────────────────────
    Refresh,
    Submit(Ticket, Mutation),
    DismissError,

    // ── Dialogs ──────────────────────────────────────────────────────────────
    OpenCreate,
    OpenEdit(PlaylistRecord),
    OpenDelete(PlaylistRecord),
    DialogClosed,

    // ── Search / genre ───────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    QueryChanged(String),
    NextGenre,
    PrevGenre,

    // ── UI ───────────────────────────────────────────────────────────────────
    ToggleHelp,
    CopyToClipboard(String),
    Notify(String),
    Quit,
}
