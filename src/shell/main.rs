use tracing_subscriber::{EnvFilter, fmt};

use vote_tally::shell::config::{AppConfig, StoreBackend};
use vote_tally::shell::http::router;
use vote_tally::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory score store, votes are lost on restart")
        }
        StoreBackend::File(path) => {
            tracing::info!(path = %path.display(), "using JSON file score store")
        }
    }

    let app = router(AppState::from_config(&config));

    tracing::info!(
        addr = %config.addr,
        max_attempts = config.retry.max_attempts,
        base_delay_ms = config.retry.base_delay.as_millis() as u64,
        "scores endpoint: http://{}/scores",
        config.addr
    );
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
