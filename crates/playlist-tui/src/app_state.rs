//! AppState: read-only data handed to every component.
//!
//! Holds the last store snapshot and the view settings (query, genre). The
//! App event loop is the only writer.

use playlist_proto::{filter_indices, GenreFilter, PlaylistRecord, StoreSnapshot};

use crate::widgets::status_bar::InputMode;

#[derive(Debug, Default)]
pub struct AppState {
    pub snapshot: StoreSnapshot,
    pub query: String,
    pub genre: GenreFilter,
    pub input_mode: InputMode,
}

impl AppState {
    pub fn records(&self) -> &[PlaylistRecord] {
        &self.snapshot.records
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.snapshot.last_error.as_deref()
    }

    /// Positions in `records()` that pass the search and genre selector.
    pub fn visible_indices(&self) -> Vec<usize> {
        filter_indices(&self.snapshot.records, &self.query, &self.genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_proto::Genre;

    fn record(title: &str, genre: Genre) -> PlaylistRecord {
        PlaylistRecord {
            title: title.to_string(),
            genre,
            ..Default::default()
        }
    }

    #[test]
    fn visible_indices_apply_query_and_genre() {
        let mut state = AppState::default();
        state.snapshot.records = vec![
            record("Lo-fi Beats", Genre::Music),
            record("React Tutorial", Genre::Education),
            record("Lo-fi Lectures", Genre::Education),
        ];
        assert_eq!(state.visible_indices(), vec![0, 1, 2]);
        state.query = "LO-FI".into();
        assert_eq!(state.visible_indices(), vec![0, 2]);
        state.genre = GenreFilter::Only(Genre::Education);
        assert_eq!(state.visible_indices(), vec![2]);
    }
}
