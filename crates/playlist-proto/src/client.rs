//! Remote collection client for the playlist API.
//!
//! Holds no state beyond the pooled HTTP client. Every call maps a failed
//! request onto [`PlaylistError`] tagged with the [`Operation`] that failed.

use async_trait::async_trait;
use reqwest::{multipart::Form, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{Operation, PlaylistError, Result};
use crate::record::{normalize, PlaylistDraft, PlaylistId, PlaylistRecord};

/// Parsed body of a successful create/update. `Null` when the server sent
/// nothing (or nothing that parses as JSON).
pub type ServerResponse = Value;

/// The four calls the store makes against the collection.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn list(&self) -> Result<Vec<PlaylistRecord>>;
    async fn create(&self, draft: &PlaylistDraft) -> Result<ServerResponse>;
    async fn update(&self, id: &PlaylistId, draft: &PlaylistDraft) -> Result<ServerResponse>;
    async fn remove(&self, id: &PlaylistId) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PlaylistClient {
    http: reqwest::Client,
    base_url: String,
    group_id: String,
}

impl PlaylistClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "playlists/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(
            builder.build()?,
            &config.base_url,
            &config.group_id,
        ))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, group_id: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            group_id: group_id.to_string(),
        }
    }

    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.group_id)
    }

    pub fn update_url(&self, id: &PlaylistId) -> String {
        format!("{}/update/{}", self.base_url, id)
    }

    pub fn item_url(&self, id: &PlaylistId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    async fn submit(&self, op: Operation, url: String, draft: &PlaylistDraft) -> Result<ServerResponse> {
        let form = draft
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        debug!("[api] POST {} ({})", url, op);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_failure(op, e))?;

        if !response.status().is_success() {
            return Err(server_failure(op, response).await);
        }

        let body = response.text().await.map_err(|e| network_failure(op, e))?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl PlaylistApi for PlaylistClient {
    async fn list(&self) -> Result<Vec<PlaylistRecord>> {
        let op = Operation::Fetch;
        let url = self.collection_url();
        debug!("[api] GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| network_failure(op, e))?;

        if !response.status().is_success() {
            return Err(server_failure(op, response).await);
        }

        let body: Value = response.json().await.map_err(|e| network_failure(op, e))?;
        let records: Vec<PlaylistRecord> = unwrap_envelope(body)
            .iter()
            .filter(|v| v.is_object())
            .map(normalize)
            .collect();

        debug!("[api] fetched {} playlists", records.len());
        Ok(records)
    }

    async fn create(&self, draft: &PlaylistDraft) -> Result<ServerResponse> {
        self.submit(Operation::Create, self.collection_url(), draft)
            .await
    }

    async fn update(&self, id: &PlaylistId, draft: &PlaylistDraft) -> Result<ServerResponse> {
        // The API has no PATCH/PUT; updates are a POST to a dedicated path.
        self.submit(Operation::Update, self.update_url(id), draft)
            .await
    }

    async fn remove(&self, id: &PlaylistId) -> Result<()> {
        let op = Operation::Delete;
        let url = self.item_url(id);
        debug!("[api] DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| network_failure(op, e))?;

        if !response.status().is_success() {
            return Err(server_failure(op, response).await);
        }
        Ok(())
    }
}

/// Pull the record array out of a list response.
///
/// Accepts `{"datas": [...]}`, `{"data": [...]}` or a bare array; any other
/// shape is an empty collection.
pub fn unwrap_envelope(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => ["datas", "data"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Best text for a failed response: JSON `message`, then the raw body, then
/// the status line.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("message") {
            if !message.trim().is_empty() {
                return message.clone();
            }
        }
    }

    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn network_failure(op: Operation, err: reqwest::Error) -> PlaylistError {
    warn!("[api] {} failed: {}", op, err);
    PlaylistError::network(op, err)
}

async fn server_failure(op: Operation, response: Response) -> PlaylistError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    warn!("[api] {} returned {}: {}", op, status, message);
    PlaylistError::Server {
        op,
        status: status.as_u16(),
        message,
    }
}
