use people_api::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("people_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        "Starting People API in {:?} mode with {:?} store",
        config.environment,
        config.store.backend
    );

    people_api::server::serve(config).await
}
