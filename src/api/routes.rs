use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::state::SnapshotStore;
use crate::types::{ControlMsg, DerivedRow};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<SnapshotStore>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
    pub refresh_tx: mpsc::Sender<ControlMsg>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/players", get(get_players))
        .route("/players/:name", get(get_player))
        .route("/picks", get(get_picks))
        .route("/games", get(get_games))
        .route("/stats/summary", get(get_stats_summary))
        .route("/stats/latency", get(get_stats_latency))
        .route("/health", get(get_health))
        .route("/refresh", post(post_refresh))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PlayersQuery {
    pub team: Option<String>,
    pub status: Option<String>,
    pub trend: Option<String>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
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

impl From<DerivedRow> for PlayerResponse {
    fn from(row: DerivedRow) -> Self {
        Self {
            name: row.player.name,
            team: row.player.team,
            points_season: row.player.points_season,
            points_last10: row.player.points_last10,
            assists_season: row.player.assists_season,
            assists_last10: row.player.assists_last10,
            rebounds_season: row.player.rebounds_season,
            rebounds_last10: row.player.rebounds_last10,
            threes_last10: row.player.threes_last10,
            games_season: row.player.games_season,
            games_last10: row.player.games_last10,
            games_last3: row.player.games_last3,
            availability: row.availability.to_string(),
            trend: row.trend.to_string(),
            safe_pick: row.safe_pick.to_string(),
            pick_line: row.safe_pick.line(),
        }
    }
}

#[derive(Serialize)]
pub struct GameResponse {
    pub sequence: u32,
    pub status: String,
    pub home_team: String,
    pub visitor_team: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub total_players: usize,
    pub available: usize,
    pub questionable: usize,
    pub out: usize,
    pub picks: usize,
    pub games_today: usize,
    pub snapshot_age_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_players(
    State(state): State<ApiState>,
    Query(params): Query<PlayersQuery>,
) -> Json<Vec<PlayerResponse>> {
    let team = params.team.map(|t| t.to_uppercase());
    let players: Vec<PlayerResponse> = state
        .store
        .all_players()
        .into_iter()
        .filter(|r| team.as_deref().map_or(true, |t| r.player.team == t))
        .filter(|r| {
            params
                .status
                .as_deref()
                .map_or(true, |s| r.availability.to_string() == s)
        })
        .filter(|r| {
            params
                .trend
                .as_deref()
                .map_or(true, |t| r.trend.to_string() == t)
        })
        .take(params.limit.unwrap_or(usize::MAX))
        .map(PlayerResponse::from)
        .collect();

    Json(players)
}

async fn get_player(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerResponse>, StatusCode> {
    state
        .store
        .get_player(&name)
        .map(|row| Json(PlayerResponse::from(row)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_picks(State(state): State<ApiState>) -> Json<Vec<PlayerResponse>> {
    let picks = state
        .store
        .picks()
        .into_iter()
        .map(PlayerResponse::from)
        .collect();
    Json(picks)
}

async fn get_games(State(state): State<ApiState>) -> Json<Vec<GameResponse>> {
    let games = state
        .store
        .all_games()
        .into_iter()
        .map(|g| GameResponse {
            sequence: g.sequence,
            status: g.status,
            home_team: g.home_team,
            visitor_team: g.visitor_team,
        })
        .collect();
    Json(games)
}

async fn get_stats_summary(State(state): State<ApiState>) -> Json<SummaryResponse> {
    use crate::types::AvailabilityStatus::*;

    Json(SummaryResponse {
        total_players: state.store.player_count(),
        available: state.store.count_by_availability(Available),
        questionable: state.store.count_by_availability(Questionable),
        out: state.store.count_by_availability(Out),
        picks: state.store.picks().len(),
        games_today: state.store.all_games().len(),
        snapshot_age_secs: state.store.age_secs(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let (p50, p95, p99) = state.latency.percentiles();
    Json(serde_json::json!({
        "p50_ms": p50,
        "p95_ms": p95,
        "p99_ms": p99,
        "sample_count": state.latency.len(),
    }))
}

async fn get_health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "feed_ok": state.health.feed_ok(),
        "last_fetch_at_ns": state.health.last_fetch_at_ns(),
        "consecutive_failures": state.health.consecutive_failures(),
        "snapshot_players": state.health.snapshot_players(),
        "snapshot_age_secs": state.store.age_secs(),
    }))
}

async fn post_refresh(State(state): State<ApiState>) -> (StatusCode, Json<serde_json::Value>) {
    if let Err(e) = state.refresh_tx.try_send(ControlMsg::RefreshNow) {
        warn!("Refresh request dropped, refresher busy: {e}");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "accepted": false })),
        );
    }
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": true })),
    )
}
