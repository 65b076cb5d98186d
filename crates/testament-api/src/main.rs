//! # testament-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080). Drafts are
//! kept in Postgres when `DATABASE_URL` is set, in memory otherwise.

use std::sync::Arc;

use testament_api::state::{AppConfig, AppState};
use testament_store::{FallbackDraftStore, PgDraftStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // LOG_FORMAT=json for log shippers; human-readable otherwise.
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env();
    tracing::info!(?config, "configuration loaded");

    let drafts = match config.database_url.as_deref() {
        Some(url) => {
            let pg = PgDraftStore::connect(url).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            FallbackDraftStore::new(Arc::new(pg))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, drafts are kept in memory only");
            FallbackDraftStore::memory_only()
        }
    };

    let port = config.port;
    let app = testament_api::app(AppState::with_store(config, drafts));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Testament API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
