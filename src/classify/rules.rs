//! Pure row classifiers: availability, trend, safe pick.
//! No I/O, no shared state — one categorical decision per row per fetch.

use crate::config::Thresholds;
use crate::types::{AvailabilityStatus, DerivedRow, PlayerRow, SafePick, Trend};

/// Classify a full table. Empty in, empty out.
pub fn classify_rows(rows: Vec<PlayerRow>, t: &Thresholds) -> Vec<DerivedRow> {
    rows.into_iter().map(|row| classify_row(row, t)).collect()
}

/// Classify one player row on all three dimensions.
pub fn classify_row(row: PlayerRow, t: &Thresholds) -> DerivedRow {
    let row = sanitize(row);
    let availability = availability(&row, t);
    let trend = trend(availability, &row, t);
    let safe_pick = safe_pick(availability, &row, t);
    DerivedRow { player: row, availability, trend, safe_pick }
}

/// Availability from games-played counts alone.
///
/// A player at or below `established_gp` season games is never OUT — a
/// debutant with empty recent windows simply hasn't had the chance to play.
pub fn availability(row: &PlayerRow, t: &Thresholds) -> AvailabilityStatus {
    if row.games_last3 == 0 && row.games_last10 == 0 && row.games_season > t.established_gp {
        AvailabilityStatus::Out
    } else if row.games_last3 == 0 && row.games_last10 > 0 {
        AvailabilityStatus::Questionable
    } else {
        AvailabilityStatus::Available
    }
}

/// One trend rule: first predicate to hit wins.
struct TrendRule {
    label: Trend,
    applies: fn(&PlayerRow, &Thresholds) -> bool,
}

/// Ordered by priority — points, then assists, then rebounds, then threes.
/// Reordering this table changes classifier semantics.
const TREND_RULES: &[TrendRule] = &[
    TrendRule {
        label: Trend::HotOver,
        applies: |r, t| r.points_last10 - r.points_season >= t.hot_points_diff,
    },
    TrendRule {
        label: Trend::ColdUnder,
        applies: |r, t| r.points_last10 - r.points_season <= t.cold_points_diff,
    },
    TrendRule {
        label: Trend::AssistFocus,
        applies: |r, t| r.assists_last10 > r.assists_season + t.assist_diff,
    },
    TrendRule {
        label: Trend::ReboundFocus,
        applies: |r, t| r.rebounds_last10 > r.rebounds_season + t.rebound_diff,
    },
    TrendRule {
        label: Trend::ThreeFocus,
        applies: |r, t| r.threes_last10 > r.threes_season + t.three_diff,
    },
];

/// Recent-form trend. Anything not AVAILABLE is AVOID; otherwise the first
/// matching rule in `TREND_RULES`, falling back to STABLE.
pub fn trend(availability: AvailabilityStatus, row: &PlayerRow, t: &Thresholds) -> Trend {
    if availability != AvailabilityStatus::Available {
        return Trend::Avoid;
    }
    TREND_RULES
        .iter()
        .find(|rule| (rule.applies)(row, t))
        .map(|rule| rule.label)
        .unwrap_or(Trend::Stable)
}

/// Conservative points line: deflate the last-10 average (season average
/// when the last-10 is empty), floor it, and only offer the pick when the
/// result clears the floor.
pub fn safe_pick(availability: AvailabilityStatus, row: &PlayerRow, t: &Thresholds) -> SafePick {
    if availability != AvailabilityStatus::Available {
        return SafePick::NoPick;
    }
    let reference = if row.points_last10 > 0.0 {
        row.points_last10
    } else {
        row.points_season
    };
    let value = (reference * t.pick_deflation).floor();
    if value > t.pick_floor as f64 {
        SafePick::Over(value - 0.5)
    } else {
        SafePick::NoPick
    }
}

/// Coerce non-finite or negative averages to zero so a degraded feed can
/// only degrade a label, never abort classification.
fn sanitize(mut row: PlayerRow) -> PlayerRow {
    for v in [
        &mut row.minutes_season,
        &mut row.points_season,
        &mut row.assists_season,
        &mut row.rebounds_season,
        &mut row.threes_season,
        &mut row.points_last10,
        &mut row.assists_last10,
        &mut row.rebounds_last10,
        &mut row.threes_last10,
    ] {
        if !v.is_finite() || *v < 0.0 {
            *v = 0.0;
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gp_season: u32, gp_last10: u32, gp_last3: u32) -> PlayerRow {
        PlayerRow {
            name: "Test Player".to_string(),
            team: "BOS".to_string(),
            minutes_season: 30.0,
            points_season: 20.0,
            assists_season: 5.0,
            rebounds_season: 5.0,
            threes_season: 2.0,
            points_last10: 20.0,
            assists_last10: 5.0,
            rebounds_last10: 5.0,
            threes_last10: 2.0,
            games_season: gp_season,
            games_last10: gp_last10,
            games_last3: gp_last3,
        }
    }

    fn t() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn debutant_is_never_out() {
        for gp_season in [0, 1, 2] {
            let status = availability(&row(gp_season, 0, 0), &t());
            assert_ne!(status, AvailabilityStatus::Out, "gp_season={gp_season}");
        }
    }

    #[test]
    fn fully_absent_veteran_is_out() {
        assert_eq!(availability(&row(10, 0, 0), &t()), AvailabilityStatus::Out);
    }

    #[test]
    fn recent_absence_is_questionable() {
        assert_eq!(availability(&row(20, 5, 0), &t()), AvailabilityStatus::Questionable);
    }

    #[test]
    fn playing_is_available() {
        assert_eq!(availability(&row(20, 10, 3), &t()), AvailabilityStatus::Available);
    }

    #[test]
    fn points_trend_beats_assist_trend() {
        // Both the hot rule and the assist rule fire — points priority wins.
        let mut r = row(20, 10, 3);
        r.points_last10 = r.points_season + 5.0;
        r.assists_last10 = r.assists_season + 3.0;
        assert_eq!(trend(AvailabilityStatus::Available, &r, &t()), Trend::HotOver);
    }

    #[test]
    fn assist_trend_beats_rebound_trend() {
        let mut r = row(20, 10, 3);
        r.assists_last10 = r.assists_season + 2.0;
        r.rebounds_last10 = r.rebounds_season + 2.0;
        assert_eq!(trend(AvailabilityStatus::Available, &r, &t()), Trend::AssistFocus);
    }

    #[test]
    fn cold_under_on_scoring_drop() {
        let mut r = row(20, 10, 3);
        r.points_last10 = r.points_season - 4.0;
        assert_eq!(trend(AvailabilityStatus::Available, &r, &t()), Trend::ColdUnder);
    }

    #[test]
    fn three_focus_is_lowest_priority_focus() {
        let mut r = row(20, 10, 3);
        r.threes_last10 = r.threes_season + 1.5;
        assert_eq!(trend(AvailabilityStatus::Available, &r, &t()), Trend::ThreeFocus);

        r.rebounds_last10 = r.rebounds_season + 2.0;
        assert_eq!(trend(AvailabilityStatus::Available, &r, &t()), Trend::ReboundFocus);
    }

    #[test]
    fn unavailable_is_always_avoid() {
        let mut r = row(18, 0, 0);
        r.points_last10 = r.points_season + 10.0;
        assert_eq!(trend(AvailabilityStatus::Out, &r, &t()), Trend::Avoid);
        assert_eq!(trend(AvailabilityStatus::Questionable, &r, &t()), Trend::Avoid);
    }

    #[test]
    fn safe_pick_deflates_and_halves() {
        let mut r = row(20, 10, 3);
        r.points_last10 = 25.0;
        // floor(25 * 0.7) = 17 → OVER 16.5
        assert_eq!(
            safe_pick(AvailabilityStatus::Available, &r, &t()),
            SafePick::Over(16.5)
        );
    }

    #[test]
    fn safe_pick_falls_back_to_season_average() {
        let mut r = row(20, 10, 3);
        r.points_last10 = 0.0;
        r.points_season = 20.0;
        // floor(20 * 0.7) = 14 → OVER 13.5
        assert_eq!(
            safe_pick(AvailabilityStatus::Available, &r, &t()),
            SafePick::Over(13.5)
        );
    }

    #[test]
    fn low_scorers_get_no_pick() {
        let mut r = row(20, 10, 3);
        r.points_last10 = 10.0;
        // floor(10 * 0.7) = 7, not above the floor of 8
        assert_eq!(safe_pick(AvailabilityStatus::Available, &r, &t()), SafePick::NoPick);
    }

    #[test]
    fn unavailable_gets_no_pick() {
        let r = row(18, 0, 0);
        assert_eq!(safe_pick(AvailabilityStatus::Out, &r, &t()), SafePick::NoPick);
        assert_eq!(safe_pick(AvailabilityStatus::Questionable, &r, &t()), SafePick::NoPick);
    }

    #[test]
    fn safe_pick_is_monotone_in_recent_points() {
        let mut last_line = 0.0;
        for pts in [13, 15, 20, 25, 30, 40] {
            let mut r = row(20, 10, 3);
            r.points_last10 = pts as f64;
            if let SafePick::Over(line) = safe_pick(AvailabilityStatus::Available, &r, &t()) {
                assert!(line >= last_line, "line {line} dropped below {last_line} at {pts} pts");
                last_line = line;
            }
        }
    }

    #[test]
    fn hot_scorer_end_to_end() {
        let mut r = row(20, 10, 3);
        r.points_season = 20.0;
        r.points_last10 = 25.0;
        let derived = classify_row(r, &t());
        assert_eq!(derived.availability, AvailabilityStatus::Available);
        assert_eq!(derived.trend, Trend::HotOver);
        assert_eq!(derived.safe_pick, SafePick::Over(16.5));
        assert_eq!(derived.safe_pick.to_string(), "OVER 16.5");
    }

    #[test]
    fn absent_veteran_end_to_end() {
        let derived = classify_row(row(18, 0, 0), &t());
        assert_eq!(derived.availability, AvailabilityStatus::Out);
        assert_eq!(derived.trend, Trend::Avoid);
        assert_eq!(derived.safe_pick, SafePick::NoPick);
    }

    #[test]
    fn classification_is_idempotent() {
        let r = row(20, 10, 3);
        let a = classify_row(r.clone(), &t());
        let b = classify_row(r, &t());
        assert_eq!(a.availability, b.availability);
        assert_eq!(a.trend, b.trend);
        assert_eq!(a.safe_pick, b.safe_pick);
    }

    #[test]
    fn nan_and_negative_inputs_coerce_to_zero() {
        let mut r = row(20, 10, 3);
        r.points_last10 = f64::NAN;
        r.points_season = -3.0;
        let derived = classify_row(r, &t());
        // Both point averages read as 0.0 — stable, no pick, no panic.
        assert_eq!(derived.trend, Trend::Stable);
        assert_eq!(derived.safe_pick, SafePick::NoPick);
        assert_eq!(derived.player.points_last10, 0.0);
        assert_eq!(derived.player.points_season, 0.0);
    }

    #[test]
    fn empty_table_classifies_to_empty() {
        assert!(classify_rows(Vec::new(), &t()).is_empty());
    }
}
