use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct SummaryResponse {
    pub total_players: usize,
    pub available: usize,
    pub questionable: usize,
    pub out: usize,
    pub picks: usize,
    pub games_today: usize,
    pub snapshot_age_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct PlayerResponse {
    pub name: String,
    pub team: String,
    pub points_season: f64,
    pub points_last10: f64,
    pub assists_season: f64,
    pub assists_last10: f64,
    pub rebounds_season: f64,
    pub rebounds_last10: f64,
    pub threes_last10: f64,
    pub games_season: u32,
    pub games_last10: u32,
    pub games_last3: u32,
    pub availability: String,
    pub trend: String,
    pub safe_pick: String,
    pub pick_line: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct GameResponse {
    pub sequence: u32,
    pub status: String,
    pub home_team: String,
    pub visitor_team: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct HealthResponse {
    pub feed_ok: Option<bool>,
    pub last_fetch_at_ns: Option<u64>,
    pub consecutive_failures: Option<u64>,
    pub snapshot_players: Option<u64>,
    pub snapshot_age_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct LatencyResponse {
    pub p50_ms: Option<u64>,
    pub p95_ms: Option<u64>,
    pub p99_ms: Option<u64>,
    pub sample_count: Option<u64>,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub summary: SummaryResponse,
    pub picks: Vec<PlayerResponse>,
    pub players: Vec<PlayerResponse>,
    pub games: Vec<GameResponse>,
    pub health: HealthResponse,
    pub latency: LatencyResponse,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            summary: SummaryResponse::default(),
            picks: Vec::new(),
            players: Vec::new(),
            games: Vec::new(),
            health: HealthResponse::default(),
            latency: LatencyResponse::default(),
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    /// Ask the scanner to re-fetch now, then re-poll shortly after.
    pub async fn request_scanner_refresh(&self, client: &reqwest::Client) {
        let url = format!("{}/refresh", self.base_url);
        let _ = client.post(&url).send().await;
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let summary_url = format!("{}/stats/summary", self.base_url);
        let picks_url = format!("{}/picks", self.base_url);
        let players_url = format!("{}/players?limit=200", self.base_url);
        let games_url = format!("{}/games", self.base_url);
        let health_url = format!("{}/health", self.base_url);
        let latency_url = format!("{}/stats/latency", self.base_url);

        let (summary_res, picks_res, players_res, games_res, health_res, latency_res) = tokio::join!(
            client.get(&summary_url).send(),
            client.get(&picks_url).send(),
            client.get(&players_url).send(),
            client.get(&games_url).send(),
            client.get(&health_url).send(),
            client.get(&latency_url).send(),
        );

        let core_ok = summary_res.is_ok() && picks_res.is_ok() && players_res.is_ok();
        if !core_ok {
            let err = summary_res
                .err()
                .or_else(|| picks_res.err())
                .or_else(|| players_res.err());
            if let Some(e) = err {
                self.status = ConnectionStatus::Error(format!("{e}"));
            }
            return;
        }

        let (summary, picks, players) = tokio::join!(
            summary_res.unwrap().json::<SummaryResponse>(),
            picks_res.unwrap().json::<Vec<PlayerResponse>>(),
            players_res.unwrap().json::<Vec<PlayerResponse>>(),
        );

        match (summary, picks, players) {
            (Ok(s), Ok(pk), Ok(pl)) => {
                self.summary = s;
                self.picks = pk;
                self.players = pl;
                self.status = ConnectionStatus::Connected;
                self.last_refresh = std::time::Instant::now();

                if let Ok(g) = games_res {
                    if let Ok(games) = g.json::<Vec<GameResponse>>().await {
                        self.games = games;
                    }
                }
                if let Ok(h) = health_res {
                    if let Ok(health) = h.json::<HealthResponse>().await {
                        self.health = health;
                    }
                }
                if let Ok(l) = latency_res {
                    if let Ok(latency) = l.json::<LatencyResponse>().await {
                        self.latency = latency;
                    }
                }
            }
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                self.status = ConnectionStatus::Error(format!("parse error: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_avg(v: f64) -> String {
    format!("{v:.1}")
}

/// Signed last-10 delta vs the season average.
pub fn format_diff(season: f64, last10: f64) -> String {
    format!("{:+.1}", last10 - season)
}

pub fn format_age(age_secs: Option<u64>) -> String {
    match age_secs {
        Some(s) if s >= 3600 => format!("{}h{}m old", s / 3600, (s % 3600) / 60),
        Some(s) if s >= 60 => format!("{}m{}s old", s / 60, s % 60),
        Some(s) => format!("{s}s old"),
        None => "no data".to_string(),
    }
}

/// Compact trend label for narrow table cells.
pub fn trend_label(trend: &str) -> &'static str {
    match trend {
        "hot_over" => "HOT",
        "cold_under" => "COLD",
        "assist_focus" => "AST+",
        "rebound_focus" => "REB+",
        "three_focus" => "3PT+",
        "stable" => "—",
        "avoid" => "avoid",
        _ => "?",
    }
}

/// Compact availability label.
pub fn status_label(status: &str) -> &'static str {
    match status {
        "available" => "OK",
        "questionable" => "GTD",
        "out" => "OUT",
        _ => "?",
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn main() {
    // TUI entry point lives in src/bin/tui.rs
}
