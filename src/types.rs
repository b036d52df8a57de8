use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw stat lines (one reporting window)
// ---------------------------------------------------------------------------

/// Which rolling window a stat line was fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatWindow {
    Season,
    Last10,
    Last3,
}

impl StatWindow {
    /// `LastNGames` request parameter value for this window (0 = full season).
    pub fn last_n_games(self) -> u32 {
        match self {
            StatWindow::Season => 0,
            StatWindow::Last10 => 10,
            StatWindow::Last3 => 3,
        }
    }
}

impl std::fmt::Display for StatWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatWindow::Season => "season",
            StatWindow::Last10 => "last10",
            StatWindow::Last3 => "last3",
        };
        write!(f, "{s}")
    }
}

/// One parsed per-game stat row for a single player in a single window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatLine {
    pub name: String,
    pub team: String,
    pub games_played: u32,
    pub minutes: f64,
    pub points: f64,
    pub assists: f64,
    pub rebounds: f64,
    pub threes: f64,
}

// ---------------------------------------------------------------------------
// Joined player row (classifier input)
// ---------------------------------------------------------------------------

/// Season + last-10 + last-3 stats for one player, joined by name.
///
/// `games_last3 <= games_last10 <= games_season` usually holds but the
/// stats feed never guarantees it — the classifiers must not rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRow {
    pub name: String,
    pub team: String,
    pub minutes_season: f64,
    pub points_season: f64,
    pub assists_season: f64,
    pub rebounds_season: f64,
    pub threes_season: f64,
    pub points_last10: f64,
    pub assists_last10: f64,
    pub rebounds_last10: f64,
    pub threes_last10: f64,
    pub games_season: u32,
    pub games_last10: u32,
    pub games_last3: u32,
}

// ---------------------------------------------------------------------------
// Availability classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    /// Played recently — ok to project.
    Available,
    /// No games in the last 3 despite activity in the last 10.
    Questionable,
    /// Established player with zero games across both recent windows.
    Out,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Questionable => "questionable",
            AvailabilityStatus::Out => "out",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Trend classification
// ---------------------------------------------------------------------------

/// Recent-form label relative to the season baseline.
/// Priority when several apply: points beats assists beats rebounds beats
/// threes — the rule table in `classify` encodes that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Scoring well above season average over the last 10.
    HotOver,
    /// Scoring well below season average over the last 10.
    ColdUnder,
    AssistFocus,
    ReboundFocus,
    ThreeFocus,
    Stable,
    /// Not available — skip entirely.
    Avoid,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trend::HotOver => "hot_over",
            Trend::ColdUnder => "cold_under",
            Trend::AssistFocus => "assist_focus",
            Trend::ReboundFocus => "rebound_focus",
            Trend::ThreeFocus => "three_focus",
            Trend::Stable => "stable",
            Trend::Avoid => "avoid",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Safe pick
// ---------------------------------------------------------------------------

/// Deliberately deflated points line expected to be exceeded with high
/// confidence, or no pick at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "line")]
pub enum SafePick {
    Over(f64),
    NoPick,
}

impl SafePick {
    pub fn line(&self) -> Option<f64> {
        match self {
            SafePick::Over(line) => Some(*line),
            SafePick::NoPick => None,
        }
    }
}

impl std::fmt::Display for SafePick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafePick::Over(line) => write!(f, "OVER {line:.1}"),
            SafePick::NoPick => write!(f, "no pick"),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived row (classifier output)
// ---------------------------------------------------------------------------

/// PlayerRow plus the three computed labels. Rebuilt whole on every fetch
/// cycle and replaced in the snapshot store — never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub player: PlayerRow,
    pub availability: AvailabilityStatus,
    pub trend: Trend,
    pub safe_pick: SafePick,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// One game from today's scoreboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRow {
    pub sequence: u32,
    /// Free-form status from the feed, e.g. "7:30 pm ET" or "Final".
    pub status: String,
    pub home_team: String,
    pub visitor_team: String,
}

// ---------------------------------------------------------------------------
// Control messages for the background refresher
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ControlMsg {
    /// Force a fetch now, ignoring snapshot staleness.
    RefreshNow,
}
