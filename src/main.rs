//! Dovetail Terminal -- Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dovetail_terminal::api::{router, AppState};
use dovetail_terminal::classify;
use dovetail_terminal::config::AppConfig;
use dovetail_terminal::feed::StooqFeed;
use dovetail_terminal::metrics::Metrics;
use dovetail_terminal::store::MemoryStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dovetail_terminal=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Arc::new(AppConfig::load_default());
    let classifier_cfg = classify::load_classifier_config();
    let metrics = Metrics::init(classifier_cfg.daily_limit.unwrap_or(20));

    // The service runs against the in-process store; `pipeline_once` is
    // the job that fills it. A database-backed TranscriptStore would be
    // wired here instead.
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        feed: Arc::new(StooqFeed::new(&config.market.symbol)),
        config: config.clone(),
    };

    let app = router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, pair = ?config.divergence, "starting dovetail terminal api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
