//! Search and genre filtering over the record list.

use std::fmt;

use crate::record::{Genre, PlaylistRecord};

/// Genre selector. `All` disables genre filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Only(Genre),
}

impl GenreFilter {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(Genre::parse(raw))
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(genre) => genre.as_str(),
        }
    }

    pub fn matches(&self, genre: &Genre) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == genre,
        }
    }

    /// All → music → … → others → All.
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Only(Genre::KNOWN[0].clone()),
            Self::Only(genre) => match Genre::KNOWN.iter().position(|g| g == genre) {
                Some(i) if i + 1 < Genre::KNOWN.len() => Self::Only(Genre::KNOWN[i + 1].clone()),
                _ => Self::All,
            },
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::All => Self::Only(Genre::KNOWN[Genre::KNOWN.len() - 1].clone()),
            Self::Only(genre) => match Genre::KNOWN.iter().position(|g| g == genre) {
                Some(i) if i > 0 => Self::Only(Genre::KNOWN[i - 1].clone()),
                _ => Self::All,
            },
        }
    }
}

impl fmt::Display for GenreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive substring match on title or description. Only the empty
/// query matches everything; whitespace is part of the needle.
pub fn query_matches(record: &PlaylistRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record.title.to_lowercase().contains(&needle)
        || record.description.to_lowercase().contains(&needle)
}

pub fn record_matches(record: &PlaylistRecord, query: &str, genre: &GenreFilter) -> bool {
    genre.matches(&record.genre) && query_matches(record, query)
}

/// Records passing both the text query and the genre selector, in list order.
pub fn filter<'a>(
    records: &'a [PlaylistRecord],
    query: &str,
    genre: &GenreFilter,
) -> Vec<&'a PlaylistRecord> {
    records
        .iter()
        .filter(|r| record_matches(r, query, genre))
        .collect()
}

/// Like [`filter`] but yields positions in `records`.
pub fn filter_indices(records: &[PlaylistRecord], query: &str, genre: &GenreFilter) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| record_matches(r, query, genre))
        .map(|(i, _)| i)
        .collect()
}
