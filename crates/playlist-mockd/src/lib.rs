//! In-memory stand-in for the remote playlist API.
//!
//! Serves the same four routes under `/api/playlist` and answers in the
//! server's own record shape (`id_play`, `play_name`, ...), wrapped in the
//! `{"datas": [...]}` envelope. Ids and `created_at` are assigned here.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Path prefix the real API lives under.
pub const API_PREFIX: &str = "/api/playlist";

const REQUIRED_FIELDS: [&str; 4] = ["play_name", "play_description", "play_url", "play_thumbnail"];

type Reply = (StatusCode, Json<Value>);

/// A playlist as the server stores and returns it.
#[derive(Debug, Clone, Serialize)]
pub struct ServerRow {
    pub id_play: u64,
    pub play_name: String,
    pub play_description: String,
    pub play_url: String,
    pub play_thumbnail: String,
    pub play_genre: String,
    pub created_at: String,
    #[serde(skip)]
    pub group: String,
}

#[derive(Debug, Default)]
struct MockDb {
    rows: Vec<ServerRow>,
    next_id: u64,
    requests: Vec<String>,
}

/// Shared handle to the mock collection. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    db: Arc<RwLock<MockDb>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection pre-filled with a few playlists for `group`.
    pub async fn seeded(group: &str) -> Self {
        let api = Self::new();
        let samples = [
            ("Lo-fi Beats to Study To", "Slow beats for long nights", "music"),
            ("React Hooks from Scratch", "useState, useEffect and friends", "education"),
            ("Heat (1995) Soundtrack", "Moby, Brian Eno, Kronos Quartet", "movie"),
            ("Road Trip Singalongs", "Songs everybody knows the words to", "song"),
        ];
        for (i, (name, description, genre)) in samples.into_iter().enumerate() {
            let mut fields = HashMap::new();
            fields.insert("play_name".to_string(), name.to_string());
            fields.insert("play_description".to_string(), description.to_string());
            fields.insert(
                "play_url".to_string(),
                format!("https://www.youtube.com/watch?v=sample{}", i + 1),
            );
            fields.insert(
                "play_thumbnail".to_string(),
                format!("https://img.youtube.com/vi/sample{}/hqdefault.jpg", i + 1),
            );
            fields.insert("play_genre".to_string(), genre.to_string());
            api.insert(group, &fields).await;
        }
        api
    }

    pub async fn rows(&self, group: &str) -> Vec<ServerRow> {
        let db = self.db.read().await;
        db.rows.iter().filter(|r| r.group == group).cloned().collect()
    }

    /// `"METHOD /path"` for every request served so far, oldest first.
    pub async fn requests(&self) -> Vec<String> {
        self.db.read().await.requests.clone()
    }

    async fn log_request(&self, line: String) {
        debug!("[mockd] {}", line);
        self.db.write().await.requests.push(line);
    }

    async fn insert(&self, group: &str, fields: &HashMap<String, String>) -> ServerRow {
        let mut db = self.db.write().await;
        db.next_id += 1;
        let row = ServerRow {
            id_play: db.next_id,
            play_name: field(fields, "play_name"),
            play_description: field(fields, "play_description"),
            play_url: field(fields, "play_url"),
            play_thumbnail: field(fields, "play_thumbnail"),
            play_genre: genre_or_default(fields),
            created_at: chrono::Local::now().format("%Y-%m-%d").to_string(),
            group: group.to_string(),
        };
        db.rows.push(row.clone());
        row
    }
}

pub fn router(api: MockApi) -> Router {
    let routes = Router::new()
        .route("/:key", get(list).post(create).delete(remove))
        .route("/update/:id", post(update));

    Router::new()
        .nest(API_PREFIX, routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(api)
}

/// Serve the mock API on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, api: MockApi) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock playlist API listening on http://{}{}", addr, API_PREFIX);
    }
    axum::serve(listener, router(api)).await
}

async fn list(State(api): State<MockApi>, Path(group): Path<String>) -> Reply {
    api.log_request(format!("GET /{}", group)).await;
    let rows = api.rows(&group).await;
    (StatusCode::OK, Json(json!({ "datas": rows })))
}

async fn create(
    State(api): State<MockApi>,
    Path(group): Path<String>,
    multipart: Multipart,
) -> Reply {
    api.log_request(format!("POST /{}", group)).await;
    let fields = match read_form(multipart).await {
        Ok(f) => f,
        Err(reply) => return reply,
    };
    if let Some(reply) = check_required(&fields) {
        return reply;
    }
    let row = api.insert(&group, &fields).await;
    info!("[mockd] created {} in group {}", row.id_play, group);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "playlist created", "datas": row })),
    )
}

async fn update(
    State(api): State<MockApi>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Reply {
    api.log_request(format!("POST /update/{}", id)).await;
    let fields = match read_form(multipart).await {
        Ok(f) => f,
        Err(reply) => return reply,
    };
    if let Some(reply) = check_required(&fields) {
        return reply;
    }

    let mut db = api.db.write().await;
    let Some(row) = db.rows.iter_mut().find(|r| r.id_play.to_string() == id) else {
        return not_found();
    };
    row.play_name = field(&fields, "play_name");
    row.play_description = field(&fields, "play_description");
    row.play_url = field(&fields, "play_url");
    row.play_thumbnail = field(&fields, "play_thumbnail");
    row.play_genre = genre_or_default(&fields);
    info!("[mockd] updated {}", id);
    (
        StatusCode::OK,
        Json(json!({ "message": "playlist updated", "datas": row.clone() })),
    )
}

async fn remove(State(api): State<MockApi>, Path(id): Path<String>) -> Reply {
    api.log_request(format!("DELETE /{}", id)).await;
    let mut db = api.db.write().await;
    let before = db.rows.len();
    db.rows.retain(|r| r.id_play.to_string() != id);
    if db.rows.len() == before {
        return not_found();
    }
    info!("[mockd] deleted {}", id);
    (StatusCode::OK, Json(json!({ "message": "playlist deleted" })))
}

async fn read_form(mut multipart: Multipart) -> Result<HashMap<String, String>, Reply> {
    let mut fields = HashMap::new();
    loop {
        let next = multipart.next_field().await.map_err(|e| {
            warn!("[mockd] bad multipart body: {}", e);
            message(StatusCode::BAD_REQUEST, "malformed form data")
        })?;
        let Some(part) = next else {
            break;
        };
        let Some(name) = part.name().map(str::to_string) else {
            continue;
        };
        let value = part
            .text()
            .await
            .map_err(|_| message(StatusCode::BAD_REQUEST, "malformed form data"))?;
        fields.insert(name, value);
    }
    // Older front-ends sent the title as play_title.
    if !fields.contains_key("play_name") {
        if let Some(title) = fields.remove("play_title") {
            fields.insert("play_name".to_string(), title);
        }
    }
    Ok(fields)
}

fn check_required(fields: &HashMap<String, String>) -> Option<Reply> {
    REQUIRED_FIELDS
        .iter()
        .find(|name| fields.get(**name).map_or(true, |v| v.trim().is_empty()))
        .map(|name| {
            message(
                StatusCode::UNPROCESSABLE_ENTITY,
                &format!("{} is required", name),
            )
        })
}

fn field(fields: &HashMap<String, String>, name: &str) -> String {
    fields
        .get(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn genre_or_default(fields: &HashMap<String, String>) -> String {
    match field(fields, "play_genre") {
        g if g.is_empty() => "others".to_string(),
        g => g,
    }
}

fn message(status: StatusCode, text: &str) -> Reply {
    (status, Json(json!({ "message": text })))
}

fn not_found() -> Reply {
    message(StatusCode::NOT_FOUND, "not found")
}
