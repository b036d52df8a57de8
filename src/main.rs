mod api;
mod classify;
mod config;
mod error;
mod fetcher;
mod refresh;
mod state;
mod types;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::{Config, CHANNEL_CAPACITY};
use crate::error::Result;
use crate::fetcher::{build_client, fetch_player_stats, fetch_scoreboard, join_windows};
use crate::refresh::SnapshotRefresher;
use crate::state::SnapshotStore;
use crate::types::{ControlMsg, StatWindow};

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
    let client = build_client()?;
    let store = SnapshotStore::new();
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());

    // --- REST bootstrap: fetch all three windows and today's schedule ---
    let started = Instant::now();
    match tokio::try_join!(
        fetch_player_stats(&client, &cfg, StatWindow::Season),
        fetch_player_stats(&client, &cfg, StatWindow::Last10),
        fetch_player_stats(&client, &cfg, StatWindow::Last3),
    ) {
        Ok((season, last10, last3)) => {
            let games = match fetch_scoreboard(&client, &cfg).await {
                Ok(g) => g,
                Err(e) => {
                    warn!("Scoreboard fetch failed at bootstrap: {e}");
                    Vec::new()
                }
            };
            let (rows, stats) = join_windows(season, last10, last3);
            let derived = classify::classify_rows(rows, &cfg.thresholds);
            let game_count = games.len();
            store.replace(derived, games);
            latency.record(started.elapsed());
            health.record_fetch_ok(store.player_count());

            info!(
                "Bootstrap complete: {} players joined from {}/{}/{} API rows, {} games (season {})",
                stats.joined,
                stats.api_rows_season,
                stats.api_rows_last10,
                stats.api_rows_last3,
                game_count,
                cfg.season,
            );
            info!(
                "[JOIN] missing recent windows: last10={} last3={}",
                stats.missing_last10, stats.missing_last3,
            );
        }
        Err(e) => {
            // Serve an empty snapshot; the refresher retries on its tick.
            health.record_fetch_failure();
            warn!("Bootstrap fetch failed, starting with empty snapshot: {e}");
        }
    }

    // --- Channels ---
    let (refresh_tx, refresh_rx) = mpsc::channel::<ControlMsg>(CHANNEL_CAPACITY);

    // --- Background refresher ---
    let refresher = SnapshotRefresher::new(
        cfg.clone(),
        client.clone(),
        Arc::clone(&store),
        Arc::clone(&health),
        Arc::clone(&latency),
        refresh_rx,
    );
    tokio::spawn(async move { refresher.run().await });

    // --- HTTP API server ---
    let api_state = ApiState {
        store: Arc::clone(&store),
        health: Arc::clone(&health),
        latency: Arc::clone(&latency),
        refresh_tx,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
