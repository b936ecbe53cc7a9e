use playlist_mockd::MockApi;
use playlist_proto::config::Config;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = playlist_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("mockd.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,playlist_mockd=debug")),
        )
        .init();

    info!("Log file: {:?}", log_path);

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    let addr = format!("{}:{}", config.mock.bind_address, config.mock.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let api = MockApi::seeded(&config.api.group_id).await;

    eprintln!(
        "mock playlist API on http://{}{}/{} (log: {})",
        addr,
        playlist_mockd::API_PREFIX,
        config.api.group_id,
        log_path.display()
    );

    playlist_mockd::serve(listener, api).await?;
    Ok(())
}
