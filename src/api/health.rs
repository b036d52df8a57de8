//! Shared health state for the /health endpoint.
//! Updated by the bootstrap path and the SnapshotRefresher.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared health metrics. Refresher writes, API reads.
#[derive(Default)]
pub struct HealthState {
    /// True after the most recent fetch cycle succeeded.
    pub feed_ok: AtomicBool,
    /// Nanosecond timestamp of the last successful fetch (0 = none).
    pub last_fetch_at_ns: AtomicU64,
    /// Fetch failures since the last success.
    pub consecutive_failures: AtomicU64,
    /// Player rows in the current snapshot.
    pub snapshot_players: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch_ok(&self, players: usize) {
        self.feed_ok.store(true, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.snapshot_players.store(players as u64, Ordering::Relaxed);
        self.last_fetch_at_ns.store(now_ns(), Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.feed_ok.store(false, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn feed_ok(&self) -> bool {
        self.feed_ok.load(Ordering::Relaxed)
    }

    pub fn last_fetch_at_ns(&self) -> u64 {
        self.last_fetch_at_ns.load(Ordering::Relaxed)
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn snapshot_players(&self) -> u64 {
        self.snapshot_players.load(Ordering::Relaxed)
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
