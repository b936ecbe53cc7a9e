//! Canonical playlist record and the normalizer that builds it from
//! whatever shape the API hands back.
//!
//! The API is inconsistent about field names: titles arrive as `play_title`
//! or `play_name`, ids under any of [`ID_FIELDS`]. [`normalize`] folds all of
//! that into one [`PlaylistRecord`]; raw JSON never travels further than the
//! client.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Field, PlaylistError};

/// Id aliases in lookup order. The first present, non-empty one wins.
pub const ID_FIELDS: [&str; 4] = ["id", "id_play", "play_id", "playlist_id"];

/// Opaque server-assigned identifier. Numeric ids are kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Playlist category. Values the client does not know are carried through
/// untouched instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Genre {
    Music,
    Movie,
    Education,
    Song,
    #[default]
    Others,
    Other(String),
}

impl Genre {
    /// Genres offered by the create/edit dialogs, in selector order.
    pub const KNOWN: [Genre; 5] = [
        Genre::Music,
        Genre::Movie,
        Genre::Education,
        Genre::Song,
        Genre::Others,
    ];

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "others" => Self::Others,
            "music" => Self::Music,
            "movie" => Self::Movie,
            "education" => Self::Education,
            "song" => Self::Song,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Music => "music",
            Self::Movie => "movie",
            Self::Education => "education",
            Self::Song => "song",
            Self::Others => "others",
            Self::Other(s) => s,
        }
    }

    /// Next entry of [`Genre::KNOWN`], wrapping. Unknown genres restart at the top.
    pub fn next(&self) -> Self {
        let pos = Self::KNOWN.iter().position(|g| g == self);
        match pos {
            Some(i) => Self::KNOWN[(i + 1) % Self::KNOWN.len()].clone(),
            None => Self::KNOWN[0].clone(),
        }
    }

    pub fn prev(&self) -> Self {
        let pos = Self::KNOWN.iter().position(|g| g == self);
        match pos {
            Some(0) | None => Self::KNOWN[Self::KNOWN.len() - 1].clone(),
            Some(i) => Self::KNOWN[i - 1].clone(),
        }
    }
}

impl From<String> for Genre {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Genre> for String {
    fn from(genre: Genre) -> Self {
        genre.as_str().to_string()
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one record shape the rest of the application sees.
///
/// Serializes under the keys [`normalize`] reads, so normalizing a serialized
/// record gives the same record back.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlaylistRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PlaylistId>,
    #[serde(rename = "play_title")]
    pub title: String,
    #[serde(rename = "play_description")]
    pub description: String,
    #[serde(rename = "play_url")]
    pub url: String,
    #[serde(rename = "play_thumbnail")]
    pub thumbnail: String,
    #[serde(rename = "play_genre")]
    pub genre: Genre,
    /// Server-assigned, display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl PlaylistRecord {
    /// Id required by update/delete.
    pub fn require_id(&self) -> Result<&PlaylistId, PlaylistError> {
        self.id.as_ref().ok_or(PlaylistError::MissingId)
    }
}

/// Build a canonical record from one element of an API response.
///
/// Total: non-object input produces an empty record with no id.
pub fn normalize(raw: &Value) -> PlaylistRecord {
    let title = ["play_title", "play_name"]
        .iter()
        .filter_map(|key| text(raw, key))
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default();

    PlaylistRecord {
        id: resolve_id(raw),
        title,
        description: text(raw, "play_description").unwrap_or_default(),
        url: text(raw, "play_url").unwrap_or_default(),
        thumbnail: text(raw, "play_thumbnail").unwrap_or_default(),
        genre: text(raw, "play_genre")
            .map(|g| Genre::parse(&g))
            .unwrap_or_default(),
        created_at: text(raw, "created_at").or_else(|| text(raw, "createdAt")),
    }
}

/// Walk the id fallback chain on a raw value.
pub fn resolve_id(raw: &Value) -> Option<PlaylistId> {
    ID_FIELDS.iter().find_map(|key| match raw.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(PlaylistId::new(s.trim())),
        Value::Number(n) => Some(PlaylistId::new(n.to_string())),
        _ => None,
    })
}

fn text(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// User-editable fields of a playlist, as collected by the create/edit dialogs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaylistDraft {
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail: String,
    pub genre: Genre,
}

impl PlaylistDraft {
    pub fn from_record(record: &PlaylistRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            url: record.url.clone(),
            thumbnail: record.thumbnail.clone(),
            genre: record.genre.clone(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Url => &self.url,
            Field::Thumbnail => &self.thumbnail,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Url => &mut self.url,
            Field::Thumbnail => &mut self.thumbnail,
        }
    }

    /// First blank required field. Whitespace-only counts as blank.
    pub fn missing_field(&self) -> Option<Field> {
        Field::REQUIRED
            .into_iter()
            .find(|f| self.field(*f).trim().is_empty())
    }

    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    pub fn validate(&self) -> Result<(), PlaylistError> {
        match self.missing_field() {
            Some(field) => Err(PlaylistError::Validation { field }),
            None => Ok(()),
        }
    }

    /// Multipart field names and values, as the API expects them.
    pub fn form_fields(&self) -> [(&'static str, String); 5] {
        [
            ("play_name", self.title.trim().to_string()),
            ("play_url", self.url.trim().to_string()),
            ("play_thumbnail", self.thumbnail.trim().to_string()),
            ("play_genre", self.genre.as_str().to_string()),
            ("play_description", self.description.trim().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roundtrip(record: &PlaylistRecord) -> PlaylistRecord {
        normalize(&serde_json::to_value(record).unwrap())
    }

    #[test]
    fn play_title_wins_over_play_name() {
        let r = normalize(&json!({"id": 1, "play_title": "Title", "play_name": "Name"}));
        assert_eq!(r.title, "Title");
    }

    #[test]
    fn blank_play_title_falls_back_to_play_name() {
        let r = normalize(&json!({"id": 1, "play_title": "  ", "play_name": "Mix"}));
        assert_eq!(r.title, "Mix");
        let r = normalize(&json!({"id": 1, "play_name": "Mix"}));
        assert_eq!(r.title, "Mix");
    }

    #[test]
    fn id_aliases_are_tried_in_order() {
        assert_eq!(
            resolve_id(&json!({"id_play": 7, "playlist_id": "x"})),
            Some(PlaylistId::new("7"))
        );
        assert_eq!(
            resolve_id(&json!({"id": null, "play_id": "abc"})),
            Some(PlaylistId::new("abc"))
        );
        assert_eq!(
            resolve_id(&json!({"id": "", "playlist_id": 12})),
            Some(PlaylistId::new("12"))
        );
        assert_eq!(resolve_id(&json!({"play_name": "no id"})), None);
    }

    #[test]
    fn normalize_is_total() {
        assert_eq!(normalize(&json!(null)), PlaylistRecord::default());
        assert_eq!(normalize(&json!([1, 2, 3])), PlaylistRecord::default());
        assert_eq!(normalize(&json!("text")).id, None);
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            json!({"id": 1, "play_name": "Mix", "play_genre": "music", "created_at": "2024-01-02"}),
            json!({"id_play": "9", "play_title": "Lecture", "play_name": "old", "play_genre": "Jazz"}),
            json!({"playlist_id": 3, "play_title": "", "play_name": "", "play_description": "d"}),
            json!({"play_id": 4, "createdAt": "yesterday", "play_url": "https://x"}),
            json!({}),
        ];
        for raw in samples {
            let once = normalize(&raw);
            assert_eq!(roundtrip(&once), once, "not idempotent for {raw}");
        }
    }

    #[test]
    fn unknown_genre_passes_through() {
        let r = normalize(&json!({"id": 1, "play_genre": "Podcast"}));
        assert_eq!(r.genre, Genre::Other("Podcast".to_string()));
        assert_eq!(r.genre.as_str(), "Podcast");

        let r = normalize(&json!({"id": 1, "play_genre": "MUSIC"}));
        assert_eq!(r.genre, Genre::Music);

        let r = normalize(&json!({"id": 1}));
        assert_eq!(r.genre, Genre::Others);
    }

    #[test]
    fn genre_cycles_through_known_values() {
        assert_eq!(Genre::Music.next(), Genre::Movie);
        assert_eq!(Genre::Others.next(), Genre::Music);
        assert_eq!(Genre::Music.prev(), Genre::Others);
        assert_eq!(Genre::Other("x".into()).next(), Genre::Music);
    }

    #[test]
    fn missing_field_reports_first_blank() {
        let mut draft = PlaylistDraft {
            title: "Lo-fi".into(),
            description: "beats".into(),
            url: "".into(),
            thumbnail: " ".into(),
            genre: Genre::Music,
        };
        assert_eq!(draft.missing_field(), Some(Field::Url));
        assert_eq!(
            draft.validate(),
            Err(PlaylistError::Validation { field: Field::Url })
        );

        draft.url = "https://youtu.be/x".into();
        assert_eq!(draft.missing_field(), Some(Field::Thumbnail));

        draft.thumbnail = "https://img/x.png".into();
        assert!(draft.is_complete());
    }

    #[test]
    fn form_fields_use_api_names() {
        let draft = PlaylistDraft {
            title: " Mix ".into(),
            description: "d".into(),
            url: "u".into(),
            thumbnail: "t".into(),
            genre: Genre::Education,
        };
        let fields = draft.form_fields();
        assert_eq!(fields[0], ("play_name", "Mix".to_string()));
        assert_eq!(fields[3], ("play_genre", "education".to_string()));
        assert_eq!(fields[4].0, "play_description");
    }
}
