use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::classify;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{fetch_player_stats, fetch_scoreboard, join_windows};
use crate::state::SnapshotStore;
use crate::types::{ControlMsg, StatWindow};

/// Background task that keeps the snapshot fresh. Wakes on a fixed tick to
/// check staleness and on control messages for manual refreshes. A failed
/// fetch keeps the previous snapshot in place — stale data beats no data.
pub struct SnapshotRefresher {
    cfg: Config,
    client: reqwest::Client,
    store: Arc<SnapshotStore>,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
    control_rx: mpsc::Receiver<ControlMsg>,
}

impl SnapshotRefresher {
    pub fn new(
        cfg: Config,
        client: reqwest::Client,
        store: Arc<SnapshotStore>,
        health: Arc<HealthState>,
        latency: Arc<LatencyStats>,
        control_rx: mpsc::Receiver<ControlMsg>,
    ) -> Self {
        Self { cfg, client, store, health, latency, control_rx }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(Duration::from_secs(self.cfg.refresh_tick_secs));
        ticker.tick().await; // skip immediate first tick — bootstrap already ran

        loop {
            let forced = tokio::select! {
                _ = ticker.tick() => false,
                msg = self.control_rx.recv() => match msg {
                    Some(ControlMsg::RefreshNow) => true,
                    None => return,
                },
            };

            if !forced && !self.store.is_stale(self.cfg.snapshot_ttl_secs) {
                continue;
            }

            match self.refresh().await {
                Ok(()) => self.health.record_fetch_ok(self.store.player_count()),
                Err(e) => {
                    self.health.record_fetch_failure();
                    error!("Snapshot refresh failed, keeping previous snapshot: {e}");
                }
            }
        }
    }

    async fn refresh(&self) -> Result<()> {
        let started = Instant::now();

        let (season, last10, last3) = tokio::try_join!(
            fetch_player_stats(&self.client, &self.cfg, StatWindow::Season),
            fetch_player_stats(&self.client, &self.cfg, StatWindow::Last10),
            fetch_player_stats(&self.client, &self.cfg, StatWindow::Last3),
        )?;

        // Schedule failures are non-fatal — classified players still render.
        let games = match fetch_scoreboard(&self.client, &self.cfg).await {
            Ok(g) => g,
            Err(e) => {
                warn!("Scoreboard fetch failed, keeping previous schedule: {e}");
                self.store.all_games()
            }
        };

        let (rows, stats) = join_windows(season, last10, last3);
        let derived = classify::classify_rows(rows, &self.cfg.thresholds);
        let game_count = games.len();
        self.store.replace(derived, games);

        self.latency.record(started.elapsed());
        info!(
            joined = stats.joined,
            missing_last10 = stats.missing_last10,
            missing_last3 = stats.missing_last3,
            games = game_count,
            "Snapshot refreshed: {} players, {} games in {:.1}s",
            stats.joined,
            game_count,
            started.elapsed().as_secs_f64(),
        );
        Ok(())
    }
}
