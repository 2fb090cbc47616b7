mod api;
mod config;
mod db;
mod error;
mod fetcher;
mod normalize;
mod state;
mod sync;
mod types;

use std::sync::Arc;

use sqlx::sqlite::SqliteConnectOptions;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::SeriesStore;
use crate::error::Result;
use crate::state::SyncLocks;
use crate::sync::SyncOrchestrator;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let options = SqliteConnectOptions::new()
        .filename(&cfg.db_path)
        .create_if_missing(true);
    let pool = sqlx::SqlitePool::connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Upstream configuration notice ---
    // Incomplete configuration disables only the affected sub-resources.
    for (resource, reason) in cfg.missing_endpoints() {
        warn!(resource = %resource, "[CONFIG] {resource} sync disabled: {reason}");
    }
    info!(
        timeout_s = cfg.upstream_timeout.as_secs(),
        squad_pacing_ms = cfg.squad_pacing.as_millis() as u64,
        stats_types = %cfg.stats_types.join(","),
        "[CONFIG] upstream client configured"
    );

    // --- Sync pipeline ---
    let api_port = cfg.api_port;
    let store = SeriesStore::new(pool.clone());
    let orchestrator = SyncOrchestrator::new(cfg, store, SyncLocks::new())?;

    // HTTP API server
    let app = router(ApiState { orchestrator: Arc::new(orchestrator) });
    let bind_addr = format!("0.0.0.0:{api_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
