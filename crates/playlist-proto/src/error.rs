//! Error taxonomy for the remote collection client and the store.
//!
//! Nothing here escapes `PlaylistStore`: every variant is reduced to the
//! store's `last_error` string, so `Display` is what the user reads.

use std::fmt;

use thiserror::Error;

/// Which request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Fetch => "fetch playlists",
            Self::Create => "create playlist",
            Self::Update => "update playlist",
            Self::Delete => "delete playlist",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Required draft fields, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Url,
    Thumbnail,
}

impl Field {
    pub const REQUIRED: [Field; 4] = [Field::Title, Field::Description, Field::Url, Field::Thumbnail];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Url => "url",
            Self::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaylistError {
    /// The request never got an answer, or the answer could not be read.
    #[error("failed to {op}: {detail}")]
    Network { op: Operation, detail: String },

    /// A required field was blank; caught before any request is made.
    #[error("{field} is required")]
    Validation { field: Field },

    /// The targeted record carries none of the known id fields.
    #[error("playlist has no id; it cannot be changed")]
    MissingId,

    /// Non-2xx answer. `message` is the best text the server gave us.
    #[error("{message}")]
    Server {
        op: Operation,
        status: u16,
        message: String,
    },
}

impl PlaylistError {
    pub fn network(op: Operation, err: impl fmt::Display) -> Self {
        Self::Network {
            op,
            detail: err.to_string(),
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Network { op, .. } | Self::Server { op, .. } => Some(*op),
            Self::Validation { .. } | Self::MissingId => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaylistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_bare_message() {
        let err = PlaylistError::Server {
            op: Operation::Delete,
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.operation(), Some(Operation::Delete));
    }

    #[test]
    fn network_error_names_the_operation() {
        let err = PlaylistError::network(Operation::Fetch, "connection refused");
        assert_eq!(err.to_string(), "failed to fetch playlists: connection refused");
    }

    #[test]
    fn validation_names_the_field() {
        let err = PlaylistError::Validation { field: Field::Url };
        assert_eq!(err.to_string(), "url is required");
        assert_eq!(err.operation(), None);
    }
}
