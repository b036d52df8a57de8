use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use tracing::debug;

use crate::config::{Config, FETCH_TIMEOUT_SECS, STATS_REFERER, STATS_USER_AGENT};
use crate::error::{AppError, Result};
use crate::types::{GameRow, PlayerRow, StatLine, StatWindow};

#[derive(Debug, Default)]
pub struct FetchStats {
    pub api_rows_season: usize,
    pub api_rows_last10: usize,
    pub api_rows_last3: usize,
    pub joined: usize,
    /// Season players with no last-10 row (stats zeroed on join).
    pub missing_last10: usize,
    /// Season players with no last-3 row.
    pub missing_last3: usize,
}

/// Build the shared stats API client. The endpoint refuses requests that
/// don't look like they came from the website, so the browser headers are
/// not optional.
pub fn build_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(STATS_USER_AGENT));
    headers.insert(REFERER, HeaderValue::from_static(STATS_REFERER));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch per-game player averages for one reporting window from
/// `leaguedashplayerstats`. The long tail of empty parameters is required —
/// the endpoint 400s when any of them is absent.
pub async fn fetch_player_stats(
    client: &reqwest::Client,
    cfg: &Config,
    window: StatWindow,
) -> Result<Vec<StatLine>> {
    let url = format!(
        "{}/leaguedashplayerstats?MeasureType=Base&PerMode=PerGame&Season={}\
         &SeasonType=Regular%20Season&LastNGames={}&LeagueID=00&Month=0&OpponentTeamID=0\
         &PORound=0&PaceAdjust=N&Period=0&PlusMinus=N&Rank=N&TeamID=0&Outcome=&Location=\
         &SeasonSegment=&DateFrom=&DateTo=&VsConference=&VsDivision=&GameSegment=",
        cfg.stats_api_url,
        cfg.season,
        window.last_n_games(),
    );

    let resp: serde_json::Value = client.get(&url).send().await?.json().await?;
    let lines = parse_stat_lines(&resp)?;
    debug!("fetched {} {window} stat lines", lines.len());
    Ok(lines)
}

/// Parse the `LeagueDashPlayerStats` result set out of a stats API response.
pub fn parse_stat_lines(resp: &serde_json::Value) -> Result<Vec<StatLine>> {
    let (index, rows) = result_set(resp, "LeagueDashPlayerStats")?;

    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(cells) = row.as_array() else { continue };
        let name = col_str(cells, &index, "PLAYER_NAME");
        if name.is_empty() {
            continue;
        }
        lines.push(StatLine {
            name,
            team: col_str(cells, &index, "TEAM_ABBREVIATION"),
            games_played: col_u32(cells, &index, "GP"),
            minutes: col_f64(cells, &index, "MIN"),
            points: col_f64(cells, &index, "PTS"),
            assists: col_f64(cells, &index, "AST"),
            rebounds: col_f64(cells, &index, "REB"),
            threes: col_f64(cells, &index, "FG3M"),
        });
    }
    Ok(lines)
}

/// Fetch today's schedule from `scoreboardv2`, resolving team IDs to
/// tricodes via the LineScore result set.
pub async fn fetch_scoreboard(client: &reqwest::Client, cfg: &Config) -> Result<Vec<GameRow>> {
    let url = format!(
        "{}/scoreboardv2?GameDate={}&LeagueID=00&DayOffset=0",
        cfg.stats_api_url,
        game_date_param(Utc::now().date_naive()),
    );

    let resp: serde_json::Value = client.get(&url).send().await?.json().await?;
    parse_scoreboard(&resp)
}

pub fn parse_scoreboard(resp: &serde_json::Value) -> Result<Vec<GameRow>> {
    let (header_idx, header_rows) = result_set(resp, "GameHeader")?;

    // team_id → tricode. LineScore may be absent before tip-off data is
    // populated; games then fall back to raw IDs.
    let mut tricodes: HashMap<u64, String> = HashMap::new();
    if let Ok((line_idx, line_rows)) = result_set(resp, "LineScore") {
        for row in line_rows {
            let Some(cells) = row.as_array() else { continue };
            let team_id = col_u64(cells, &line_idx, "TEAM_ID");
            let abbr = col_str(cells, &line_idx, "TEAM_ABBREVIATION");
            if team_id > 0 && !abbr.is_empty() {
                tricodes.insert(team_id, abbr);
            }
        }
    }

    let mut games = Vec::with_capacity(header_rows.len());
    for row in header_rows {
        let Some(cells) = row.as_array() else { continue };
        let home_id = col_u64(cells, &header_idx, "HOME_TEAM_ID");
        let visitor_id = col_u64(cells, &header_idx, "VISITOR_TEAM_ID");
        let team_label = |id: u64| {
            tricodes
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string())
        };
        games.push(GameRow {
            sequence: col_u32(cells, &header_idx, "GAME_SEQUENCE"),
            status: col_str(cells, &header_idx, "GAME_STATUS_TEXT"),
            home_team: team_label(home_id),
            visitor_team: team_label(visitor_id),
        });
    }
    games.sort_by_key(|g| g.sequence);
    Ok(games)
}

/// Join the three windows into classifier input rows, keyed by player name
/// (the feed keeps names unique within a season). Players missing from a
/// recent window get zeroed recent stats — the availability classifier
/// reads that as absence, which is the intended degradation.
pub fn join_windows(
    season: Vec<StatLine>,
    last10: Vec<StatLine>,
    last3: Vec<StatLine>,
) -> (Vec<PlayerRow>, FetchStats) {
    let mut stats = FetchStats {
        api_rows_season: season.len(),
        api_rows_last10: last10.len(),
        api_rows_last3: last3.len(),
        ..FetchStats::default()
    };

    let last10_by_name: HashMap<String, StatLine> =
        last10.into_iter().map(|l| (l.name.clone(), l)).collect();
    let last3_by_name: HashMap<String, StatLine> =
        last3.into_iter().map(|l| (l.name.clone(), l)).collect();

    let mut rows = Vec::with_capacity(season.len());
    for line in season {
        let recent = last10_by_name.get(&line.name);
        let short = last3_by_name.get(&line.name);
        if recent.is_none() {
            stats.missing_last10 += 1;
        }
        if short.is_none() {
            stats.missing_last3 += 1;
        }
        rows.push(PlayerRow {
            team: line.team,
            minutes_season: line.minutes,
            points_season: line.points,
            assists_season: line.assists,
            rebounds_season: line.rebounds,
            threes_season: line.threes,
            points_last10: recent.map_or(0.0, |l| l.points),
            assists_last10: recent.map_or(0.0, |l| l.assists),
            rebounds_last10: recent.map_or(0.0, |l| l.rebounds),
            threes_last10: recent.map_or(0.0, |l| l.threes),
            games_season: line.games_played,
            games_last10: recent.map_or(0, |l| l.games_played),
            games_last3: short.map_or(0, |l| l.games_played),
            name: line.name,
        });
    }

    stats.joined = rows.len();
    (rows, stats)
}

// ---------------------------------------------------------------------------
// Result-set plumbing
// ---------------------------------------------------------------------------

/// Find a named result set and return its header→index map plus row array.
fn result_set<'a>(
    resp: &'a serde_json::Value,
    name: &str,
) -> Result<(HashMap<String, usize>, &'a Vec<serde_json::Value>)> {
    let sets = resp
        .get("resultSets")
        .and_then(|s| s.as_array())
        .ok_or_else(|| AppError::StatsFeed("response has no resultSets array".to_string()))?;

    let set = sets
        .iter()
        .find(|s| s.get("name").and_then(|n| n.as_str()) == Some(name))
        .ok_or_else(|| AppError::StatsFeed(format!("result set {name} not present")))?;

    let headers = set
        .get("headers")
        .and_then(|h| h.as_array())
        .ok_or_else(|| AppError::StatsFeed(format!("result set {name} has no headers")))?;

    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.as_str().map(|s| (s.to_string(), i)))
        .collect();

    let rows = set
        .get("rowSet")
        .and_then(|r| r.as_array())
        .ok_or_else(|| AppError::StatsFeed(format!("result set {name} has no rowSet")))?;

    Ok((index, rows))
}

fn col<'a>(
    cells: &'a [serde_json::Value],
    index: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a serde_json::Value> {
    index.get(name).and_then(|&i| cells.get(i))
}

fn col_str(cells: &[serde_json::Value], index: &HashMap<String, usize>, name: &str) -> String {
    col(cells, index, name)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Numeric cell, coerced to 0.0 when missing, null, or non-numeric.
fn col_f64(cells: &[serde_json::Value], index: &HashMap<String, usize>, name: &str) -> f64 {
    col(cells, index, name)
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

fn col_u32(cells: &[serde_json::Value], index: &HashMap<String, usize>, name: &str) -> u32 {
    col(cells, index, name)
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .map(|v| v.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn col_u64(cells: &[serde_json::Value], index: &HashMap<String, usize>, name: &str) -> u64 {
    col(cells, index, name)
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or(0)
}

/// `GameDate` query value: URL-encoded MM/DD/YYYY (`%%2F` renders as `%2F`).
fn game_date_param(date: NaiveDate) -> String {
    date.format("%m%%2F%d%%2F%Y").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats_response() -> serde_json::Value {
        json!({
            "resource": "leaguedashplayerstats",
            "resultSets": [{
                "name": "LeagueDashPlayerStats",
                "headers": ["PLAYER_ID", "PLAYER_NAME", "TEAM_ABBREVIATION",
                            "GP", "MIN", "PTS", "AST", "REB", "FG3M"],
                "rowSet": [
                    [203507, "Giannis Antetokounmpo", "MIL", 20, 34.1, 30.8, 5.9, 11.2, 0.4],
                    [1629029, "Luka Doncic", "LAL", 18, 36.0, 33.9, 8.8, 9.0, 3.4],
                    [999, "", "XXX", 1, 1.0, 1.0, 1.0, 1.0, 1.0],
                    [888, "Null Stats", "BOS", null, null, "12.5", null, null, null]
                ]
            }]
        })
    }

    #[test]
    fn parses_stat_lines_by_header_name() {
        let lines = parse_stat_lines(&stats_response()).unwrap();
        // The empty-name row is skipped.
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].name, "Giannis Antetokounmpo");
        assert_eq!(lines[0].team, "MIL");
        assert_eq!(lines[0].games_played, 20);
        assert!((lines[0].points - 30.8).abs() < 1e-9);
    }

    #[test]
    fn null_and_string_cells_coerce() {
        let lines = parse_stat_lines(&stats_response()).unwrap();
        let row = &lines[2];
        assert_eq!(row.name, "Null Stats");
        assert_eq!(row.games_played, 0);
        assert_eq!(row.minutes, 0.0);
        // "12.5" arrives as a string — still parsed.
        assert!((row.points - 12.5).abs() < 1e-9);
    }

    #[test]
    fn missing_result_set_is_an_error() {
        let resp = json!({ "resultSets": [{ "name": "SomethingElse", "headers": [], "rowSet": [] }] });
        assert!(parse_stat_lines(&resp).is_err());
    }

    fn line(name: &str, gp: u32, pts: f64) -> StatLine {
        StatLine {
            name: name.to_string(),
            team: "BOS".to_string(),
            games_played: gp,
            minutes: 30.0,
            points: pts,
            assists: 4.0,
            rebounds: 6.0,
            threes: 2.0,
        }
    }

    #[test]
    fn join_zeroes_missing_recent_windows() {
        let season = vec![line("A", 20, 22.0), line("B", 15, 18.0)];
        let last10 = vec![line("A", 9, 25.0)];
        let last3 = vec![line("A", 3, 28.0)];

        let (rows, stats) = join_windows(season, last10, last3);
        assert_eq!(rows.len(), 2);
        assert_eq!(stats.missing_last10, 1);
        assert_eq!(stats.missing_last3, 1);

        let b = rows.iter().find(|r| r.name == "B").unwrap();
        assert_eq!(b.games_last10, 0);
        assert_eq!(b.games_last3, 0);
        assert_eq!(b.points_last10, 0.0);

        let a = rows.iter().find(|r| r.name == "A").unwrap();
        assert_eq!(a.games_last10, 9);
        assert!((a.points_last10 - 25.0).abs() < 1e-9);
    }

    #[test]
    fn scoreboard_joins_tricodes_from_line_score() {
        let resp = json!({
            "resultSets": [
                {
                    "name": "GameHeader",
                    "headers": ["GAME_SEQUENCE", "GAME_STATUS_TEXT", "HOME_TEAM_ID", "VISITOR_TEAM_ID"],
                    "rowSet": [
                        [2, "7:30 pm ET", 1610612738, 1610612747],
                        [1, "Final", 1610612749, 1610612759]
                    ]
                },
                {
                    "name": "LineScore",
                    "headers": ["TEAM_ID", "TEAM_ABBREVIATION"],
                    "rowSet": [
                        [1610612738, "BOS"],
                        [1610612747, "LAL"],
                        [1610612749, "MIL"]
                    ]
                }
            ]
        });

        let games = parse_scoreboard(&resp).unwrap();
        assert_eq!(games.len(), 2);
        // Sorted by sequence.
        assert_eq!(games[0].sequence, 1);
        assert_eq!(games[0].home_team, "MIL");
        // Unknown team id falls back to the raw id.
        assert_eq!(games[0].visitor_team, "1610612759");
        assert_eq!(games[1].home_team, "BOS");
        assert_eq!(games[1].visitor_team, "LAL");
        assert_eq!(games[1].status, "7:30 pm ET");
    }

    #[test]
    fn game_date_param_is_url_encoded_mdy() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(game_date_param(date), "03%2F07%2F2026");
    }
}
