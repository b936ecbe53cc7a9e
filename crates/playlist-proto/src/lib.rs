//! Playlist collection model, remote client and state container shared by
//! the terminal front-end and the local mock API.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod platform;
pub mod record;
pub mod store;

pub use client::{PlaylistApi, PlaylistClient, ServerResponse};
pub use error::{Field, Operation, PlaylistError};
pub use filter::{filter, filter_indices, GenreFilter};
pub use record::{normalize, Genre, PlaylistDraft, PlaylistId, PlaylistRecord};
pub use store::{Completion, Outcome, PlaylistStore, StoreEvent, StoreSnapshot};
