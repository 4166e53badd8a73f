pub mod api;
pub mod core;
pub mod exchange;
pub mod providers;
pub mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::{AppState, build_router};
use crate::core::config::AppConfig;

/// How often expired rate snapshots, usage windows and geolocation lookups
/// are dropped.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

pub async fn run(config_path: Option<&str>, listen: Option<&str>) -> Result<()> {
    info!("Foreign rate API starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let state = AppState::from_config(&config).context("Failed to initialise services")?;
    spawn_sweeper(state.clone());

    let addr = listen.unwrap_or(config.listen.as_str());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")
}

fn spawn_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let rates = state.resolver.cache().evict_expired().await;
            let windows = state.limiter.evict_expired().await;
            let lookups = state.geo.evict_expired().await;
            debug!(rates, windows, lookups, "Swept expired cache entries");
        }
    });
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
