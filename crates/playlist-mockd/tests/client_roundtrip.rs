//! The real HTTP client and store against the in-memory API on a local port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use playlist_mockd::{router, MockApi, API_PREFIX};
use playlist_proto::{
    Genre, Outcome, PlaylistApi, PlaylistClient, PlaylistDraft, PlaylistId, PlaylistRecord,
    PlaylistStore,
};
use serde_json::json;
use tokio::net::TcpListener;

const GROUP: &str = "33";

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}{}", addr, API_PREFIX)
}

async fn start(api: MockApi) -> PlaylistClient {
    let base = spawn(router(api)).await;
    PlaylistClient::with_http(reqwest::Client::new(), &base, GROUP)
}

fn draft(title: &str) -> PlaylistDraft {
    PlaylistDraft {
        title: title.to_string(),
        description: "late night".to_string(),
        url: "https://youtu.be/abc".to_string(),
        thumbnail: "https://img/abc.jpg".to_string(),
        genre: Genre::Music,
    }
}

#[tokio::test]
async fn list_normalizes_server_rows() {
    let api = MockApi::seeded(GROUP).await;
    let client = start(api).await;

    let records = client.list().await.unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].id, Some(PlaylistId::new("1")));
    assert_eq!(records[0].title, "Lo-fi Beats to Study To");
    assert_eq!(records[0].genre, Genre::Music);
    assert!(records[0].created_at.is_some());
}

#[tokio::test]
async fn list_reads_every_envelope_shape() {
    let row = json!({"id": 1, "play_name": "Mix", "play_genre": "music"});
    let (a, b, c) = (row.clone(), row.clone(), row);
    let app = Router::new()
        .route("/datas/33", get(move || async move { Json(json!({ "datas": [a] })) }))
        .route("/data/33", get(move || async move { Json(json!({ "data": [b] })) }))
        .route("/bare/33", get(move || async move { Json(json!([c])) }));
    let base = spawn(app).await;
    let root = base.trim_end_matches(API_PREFIX).to_string();

    for prefix in ["datas", "data", "bare"] {
        let client =
            PlaylistClient::with_http(reqwest::Client::new(), &format!("{}/{}", root, prefix), GROUP);
        let records = client.list().await.unwrap();
        assert_eq!(records.len(), 1, "{}", prefix);
        assert_eq!(records[0].id, Some(PlaylistId::new("1")));
        assert_eq!(records[0].title, "Mix");
        assert_eq!(records[0].genre, Genre::Music);
    }
}

#[tokio::test]
async fn create_posts_then_refreshes() {
    let api = MockApi::new();
    let store = PlaylistStore::new(start(api.clone()).await);

    assert_eq!(store.create(&draft("Night Drive")).await, Outcome::Done);

    assert_eq!(
        api.requests().await,
        vec![format!("POST /{}", GROUP), format!("GET /{}", GROUP)]
    );
    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Night Drive");
    assert_eq!(records[0].url, "https://youtu.be/abc");
    assert!(records[0].id.is_some());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn blank_field_sends_nothing() {
    let api = MockApi::new();
    let store = PlaylistStore::new(start(api.clone()).await);

    let mut incomplete = draft("Night Drive");
    incomplete.url = "   ".to_string();
    assert_eq!(store.create(&incomplete).await, Outcome::Skipped);
    assert!(api.requests().await.is_empty());
}

#[tokio::test]
async fn server_validation_message_reaches_the_store() {
    let api = MockApi::new();
    let client = start(api.clone()).await;

    // Bypass the store's own check to see the server's answer.
    let mut incomplete = draft("x");
    incomplete.thumbnail.clear();
    let err = client.create(&incomplete).await.unwrap_err();
    assert_eq!(err.to_string(), "play_thumbnail is required");
}

#[tokio::test]
async fn update_rewrites_the_row() {
    let api = MockApi::seeded(GROUP).await;
    let store = PlaylistStore::new(start(api.clone()).await);
    store.refresh().await;

    let target = store.records().await[1].clone();
    let mut edited = PlaylistDraft::from_record(&target);
    edited.title = "Hooks, Revisited".to_string();
    edited.genre = Genre::Education;

    assert_eq!(store.update(&target, &edited).await, Outcome::Done);

    let records = store.records().await;
    assert_eq!(records.len(), 4);
    assert_eq!(records[1].id, target.id);
    assert_eq!(records[1].title, "Hooks, Revisited");
    assert!(api
        .requests()
        .await
        .contains(&format!("POST /update/{}", target.id.unwrap())));
}

#[tokio::test]
async fn delete_of_unknown_id_reports_not_found() {
    let api = MockApi::seeded(GROUP).await;
    let store = PlaylistStore::new(start(api.clone()).await);
    store.refresh().await;
    let before = store.records().await;

    let ghost = PlaylistRecord {
        id: Some(PlaylistId::new("999")),
        title: "ghost".to_string(),
        ..Default::default()
    };
    assert_eq!(store.remove(&ghost).await, Outcome::Failed);

    assert_eq!(store.last_error().await.as_deref(), Some("not found"));
    assert_eq!(store.records().await, before);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn delete_removes_and_refreshes() {
    let api = MockApi::seeded(GROUP).await;
    let store = PlaylistStore::new(start(api.clone()).await);
    store.refresh().await;

    let victim = store.records().await[0].clone();
    assert_eq!(store.remove(&victim).await, Outcome::Done);

    let records = store.records().await;
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.id != victim.id));
    assert_eq!(store.last_error().await, None);
}

#[tokio::test]
async fn failed_refresh_keeps_stale_records() {
    let healthy = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&healthy);
    let app = Router::new().route(
        "/api/playlist/33",
        get(move || {
            let flag = Arc::clone(&flag);
            async move {
                if flag.load(Ordering::SeqCst) {
                    (StatusCode::OK, Json(json!({ "datas": [{"id_play": 7, "play_name": "Mix"}] })))
                } else {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "maintenance" })))
                }
            }
        }),
    );
    let base = spawn(app).await;
    let store = PlaylistStore::new(PlaylistClient::with_http(reqwest::Client::new(), &base, GROUP));

    assert_eq!(store.refresh().await, Outcome::Done);
    healthy.store(false, Ordering::SeqCst);
    assert_eq!(store.refresh().await, Outcome::Failed);

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.records[0].title, "Mix");
    assert_eq!(snapshot.last_error.as_deref(), Some("maintenance"));
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Nothing listens on the discard port.
    let dead = PlaylistClient::with_http(reqwest::Client::new(), "http://127.0.0.1:9/api", GROUP);
    let err = dead.list().await.unwrap_err();
    assert!(err.to_string().starts_with("failed to fetch playlists"));
}

#[tokio::test]
async fn concurrent_refreshes_settle_to_idle() {
    let api = MockApi::seeded(GROUP).await;
    let store = Arc::new(PlaylistStore::new(start(api.clone()).await));

    let outcomes = futures_util::future::join_all((0..5).map(|_| {
        let store = Arc::clone(&store);
        async move { store.refresh().await }
    }))
    .await;

    assert!(outcomes.iter().all(|o| o.is_done()));
    assert!(!store.is_loading());
    assert_eq!(api.requests().await.len(), 5);
}
