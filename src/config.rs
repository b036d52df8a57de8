pub const STATS_API_URL: &str = "https://stats.nba.com/stats";

/// Current season string for the stats API.
pub const DEFAULT_SEASON: &str = "2025-26";

/// Snapshot staleness threshold (seconds). A refresh tick that finds the
/// snapshot younger than this does nothing; a manual RefreshNow ignores it.
pub const SNAPSHOT_TTL_SECS: u64 = 600;

/// How often the refresher wakes to check staleness (seconds).
pub const REFRESH_TICK_SECS: u64 = 60;

/// Per-request timeout against the stats API (seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Channel capacity for refresher control messages.
pub const CHANNEL_CAPACITY: usize = 16;

/// The stats API rejects requests without browser-ish headers.
pub const STATS_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";
pub const STATS_REFERER: &str = "https://www.nba.com/";

use crate::error::{AppError, Result};

/// Heuristic tuning constants. Every cutoff here is experimental rather
/// than derived — keep them env-overridable, not baked into the rules.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Season games above which a fully absent player is flagged OUT.
    /// At or below it the player is treated as a debutant, never OUT.
    pub established_gp: u32,
    /// Last-10 points diff (vs season) at or above which a player is hot.
    pub hot_points_diff: f64,
    /// Last-10 points diff at or below which a player is cold.
    pub cold_points_diff: f64,
    /// Last-10 assists must exceed season assists by more than this.
    pub assist_diff: f64,
    /// Last-10 rebounds must exceed season rebounds by more than this.
    pub rebound_diff: f64,
    /// Last-10 threes must exceed season threes by more than this.
    pub three_diff: f64,
    /// Deflation factor applied to the reference points average.
    pub pick_deflation: f64,
    /// Deflated value must exceed this for a pick to be offered.
    pub pick_floor: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            established_gp: 2,
            hot_points_diff: 4.0,
            cold_points_diff: -4.0,
            assist_diff: 1.5,
            rebound_diff: 1.5,
            three_diff: 1.0,
            pick_deflation: 0.70,
            pick_floor: 8,
        }
    }
}

impl Thresholds {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            established_gp: env_parse("ORACLE_ESTABLISHED_GP", d.established_gp),
            hot_points_diff: env_parse("ORACLE_HOT_POINTS_DIFF", d.hot_points_diff),
            cold_points_diff: env_parse("ORACLE_COLD_POINTS_DIFF", d.cold_points_diff),
            assist_diff: env_parse("ORACLE_ASSIST_DIFF", d.assist_diff),
            rebound_diff: env_parse("ORACLE_REBOUND_DIFF", d.rebound_diff),
            three_diff: env_parse("ORACLE_THREE_DIFF", d.three_diff),
            pick_deflation: env_parse("ORACLE_PICK_DEFLATION", d.pick_deflation),
            pick_floor: env_parse("ORACLE_PICK_FLOOR", d.pick_floor),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub stats_api_url: String,
    pub season: String,
    pub log_level: String,
    pub api_port: u16,
    /// Snapshot staleness threshold in seconds (ORACLE_SNAPSHOT_TTL_SECS).
    pub snapshot_ttl_secs: u64,
    /// Refresher wake interval in seconds (ORACLE_REFRESH_TICK_SECS).
    pub refresh_tick_secs: u64,
    /// Heuristic cutoffs, all ORACLE_*-overridable.
    pub thresholds: Thresholds,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            stats_api_url: std::env::var("STATS_API_URL")
                .unwrap_or_else(|_| STATS_API_URL.to_string()),
            season: std::env::var("ORACLE_SEASON")
                .unwrap_or_else(|_| DEFAULT_SEASON.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            snapshot_ttl_secs: env_parse("ORACLE_SNAPSHOT_TTL_SECS", SNAPSHOT_TTL_SECS),
            refresh_tick_secs: env_parse("ORACLE_REFRESH_TICK_SECS", REFRESH_TICK_SECS),
            thresholds: Thresholds::from_env(),
        })
    }
}
