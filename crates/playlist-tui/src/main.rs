mod action;
mod app;
mod app_state;
mod component;
mod components;
mod dialog;
mod theme;
mod widgets;

use std::sync::Arc;

use playlist_proto::config::Config;
use playlist_proto::{platform, PlaylistClient, PlaylistStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = match std::fs::create_dir_all(platform::data_dir()) {
        Ok(()) => platform::data_dir(),
        Err(_) => platform::temp_dir(),
    };
    let log_path = log_dir.join("tui.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("playlists log: {}", log_path.display());

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_default();
    tracing::info!(
        "playlists starting… base_url={} group={}",
        config.api.base_url,
        config.api.group_id
    );

    // ── Collection client + store ────────────────────────────────────────────
    let client = PlaylistClient::new(&config.api)?;
    let store = Arc::new(PlaylistStore::new(client));

    // ── Run TUI ──────────────────────────────────────────────────────────────
    app::App::new(store, &config.ui).run().await?;

    tracing::info!("playlists exiting");
    Ok(())
}
