//! Lifecycle of a mutation dialog.
//!
//! ```text
//!  Closed ──open──▶ Open ──submit──▶ [PendingConfirm ──submit──▶] Submitting
//!                    ▲                      │ back                    │
//!                    └──────────────────────┴───────── failed ◀───────┤
//!  Closed ◀────────────────────────────────────────────── done ◀─────┘
//! ```
//!
//! Every `open()` starts a new generation. A submission hands out a
//! [`Ticket`] stamped with that generation; when the request completes the
//! ticket is presented back to [`DialogMachine::finish`], which ignores it
//! if the dialog was closed or reopened in the meantime. Requests are never
//! cancelled, so a late answer must be harmless.

use playlist_proto::Outcome;

/// Which dialog a ticket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Create,
    Edit,
    Delete,
}

impl DialogKind {
    pub fn busy_label(self) -> &'static str {
        match self {
            Self::Create => "Creating…",
            Self::Edit => "Updating…",
            Self::Delete => "Deleting…",
        }
    }

    pub fn done_message(self) -> &'static str {
        match self {
            Self::Create => "playlist created",
            Self::Edit => "playlist updated",
            Self::Delete => "playlist deleted",
        }
    }
}

/// Proof of one submission. Only the matching generation may finish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: DialogKind,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open,
    PendingConfirm,
    Submitting,
}

/// Result of pressing submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// Send the request now.
    Started(Ticket),
    /// Moved to the confirmation step; submit again to proceed.
    NeedsConfirm,
    /// Input incomplete or dialog not open; nothing happens.
    Blocked,
    /// A request from this dialog is already in flight.
    Busy,
}

/// What `finish` did with a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Closed,
    /// Still open, now showing the error.
    Reopened,
    /// The ticket no longer matches this dialog.
    Stale,
}

#[derive(Debug, Clone)]
pub struct DialogMachine {
    kind: DialogKind,
    phase: Phase,
    generation: u64,
    confirm_step: bool,
    error: Option<String>,
}

impl DialogMachine {
    pub fn new(kind: DialogKind, confirm_step: bool) -> Self {
        Self {
            kind,
            phase: Phase::Closed,
            generation: 0,
            confirm_step,
            error: None,
        }
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    /// Create and edit share one form, so the kind (and whether it asks for
    /// confirmation) follows whatever was opened last.
    pub fn open_as(&mut self, kind: DialogKind, confirm_step: bool) {
        self.kind = kind;
        self.confirm_step = confirm_step;
        self.open();
    }

    pub fn open(&mut self) {
        self.generation += 1;
        self.phase = Phase::Open;
        self.error = None;
    }

    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.error = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `ready` is false while required input is missing.
    pub fn begin_submit(&mut self, ready: bool) -> Submit {
        match self.phase {
            Phase::Closed => Submit::Blocked,
            Phase::Submitting => Submit::Busy,
            Phase::Open if !ready => Submit::Blocked,
            Phase::Open if self.confirm_step => {
                self.phase = Phase::PendingConfirm;
                Submit::NeedsConfirm
            }
            Phase::Open | Phase::PendingConfirm => {
                self.phase = Phase::Submitting;
                self.error = None;
                Submit::Started(Ticket {
                    kind: self.kind,
                    generation: self.generation,
                })
            }
        }
    }

    /// Step back from the confirmation prompt. Returns false if there was
    /// nothing to step back from.
    pub fn back(&mut self) -> bool {
        if self.phase == Phase::PendingConfirm {
            self.phase = Phase::Open;
            true
        } else {
            false
        }
    }

    pub fn finish(&mut self, ticket: Ticket, outcome: Outcome, error: Option<String>) -> Finish {
        if ticket.generation != self.generation
            || ticket.kind != self.kind
            || self.phase != Phase::Submitting
        {
            return Finish::Stale;
        }
        match outcome {
            Outcome::Done => {
                self.close();
                Finish::Closed
            }
            Outcome::Failed | Outcome::Skipped => {
                self.phase = Phase::Open;
                self.error = error;
                Finish::Reopened
            }
        }
    }
}
