use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{AvailabilityStatus, DerivedRow, GameRow, SafePick};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One immutable fetch result: the classified table plus today's schedule.
/// Built off to the side by a refresh and never mutated after publication.
struct Snapshot {
    /// player name → classified row
    players: HashMap<String, DerivedRow>,
    /// Today's games in schedule order.
    games: Vec<GameRow>,
    /// Nanosecond UTC epoch of the fetch (0 = never fetched).
    fetched_at_ns: u64,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            players: HashMap::new(),
            games: Vec::new(),
            fetched_at_ns: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// Holds the current snapshot behind a single pointer swap. A refresh
/// publishes a fully built replacement in one store, so a concurrent reader
/// sees either the old table or the new one, never a mix. The snapshot's
/// fetch timestamp doubles as the staleness cache key — the refresher skips
/// fetches while `is_stale` is false.
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        })
    }

    /// Swap in a freshly classified table and stamp the fetch time.
    pub fn replace(&self, rows: Vec<DerivedRow>, mut games: Vec<GameRow>) {
        games.sort_by_key(|g| g.sequence);
        let snapshot = Arc::new(Snapshot {
            players: rows
                .into_iter()
                .map(|row| (row.player.name.clone(), row))
                .collect(),
            games,
            fetched_at_ns: now_ns(),
        });
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    /// Grab the current snapshot. The lock is held only for the Arc clone;
    /// all reads then run against the immutable snapshot.
    fn snapshot(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// All classified rows, best recent scorers first.
    pub fn all_players(&self) -> Vec<DerivedRow> {
        let snapshot = self.snapshot();
        let mut rows: Vec<DerivedRow> = snapshot.players.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.player
                .points_last10
                .partial_cmp(&a.player.points_last10)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        rows
    }

    pub fn get_player(&self, name: &str) -> Option<DerivedRow> {
        self.snapshot().players.get(name).cloned()
    }

    /// Rows carrying an actual pick, highest line first.
    pub fn picks(&self) -> Vec<DerivedRow> {
        let snapshot = self.snapshot();
        let mut rows: Vec<DerivedRow> = snapshot
            .players
            .values()
            .filter(|r| r.safe_pick != SafePick::NoPick)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.safe_pick
                .line()
                .partial_cmp(&a.safe_pick.line())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        rows
    }

    pub fn count_by_availability(&self, status: AvailabilityStatus) -> usize {
        self.snapshot()
            .players
            .values()
            .filter(|r| r.availability == status)
            .count()
    }

    pub fn player_count(&self) -> usize {
        self.snapshot().players.len()
    }

    /// Today's games in schedule order.
    pub fn all_games(&self) -> Vec<GameRow> {
        self.snapshot().games.clone()
    }

    pub fn fetched_at_ns(&self) -> u64 {
        self.snapshot().fetched_at_ns
    }

    /// True when the snapshot is older than `ttl_secs` (or never fetched).
    pub fn is_stale(&self, ttl_secs: u64) -> bool {
        let fetched = self.fetched_at_ns();
        if fetched == 0 {
            return true;
        }
        now_ns().saturating_sub(fetched) > ttl_secs.saturating_mul(1_000_000_000)
    }

    /// Snapshot age in seconds, None if nothing was ever fetched.
    pub fn age_secs(&self) -> Option<u64> {
        let fetched = self.fetched_at_ns();
        if fetched == 0 {
            return None;
        }
        Some(now_ns().saturating_sub(fetched) / 1_000_000_000)
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlayerRow, Trend};

    fn derived(name: &str, team: &str, points_last10: f64, pick: SafePick) -> DerivedRow {
        DerivedRow {
            player: PlayerRow {
                name: name.to_string(),
                team: team.to_string(),
                minutes_season: 30.0,
                points_season: 20.0,
                assists_season: 5.0,
                rebounds_season: 5.0,
                threes_season: 2.0,
                points_last10,
                assists_last10: 5.0,
                rebounds_last10: 5.0,
                threes_last10: 2.0,
                games_season: 20,
                games_last10: 10,
                games_last3: 3,
            },
            availability: AvailabilityStatus::Available,
            trend: Trend::Stable,
            safe_pick: pick,
        }
    }

    #[test]
    fn replace_swaps_the_whole_table() {
        let store = SnapshotStore::new();
        store.replace(
            vec![derived("A", "BOS", 20.0, SafePick::NoPick)],
            vec![],
        );
        assert_eq!(store.player_count(), 1);

        store.replace(
            vec![
                derived("B", "LAL", 25.0, SafePick::NoPick),
                derived("C", "MIL", 30.0, SafePick::NoPick),
            ],
            vec![],
        );
        assert_eq!(store.player_count(), 2);
        assert!(store.get_player("A").is_none());
    }

    #[test]
    fn players_sorted_by_recent_points() {
        let store = SnapshotStore::new();
        store.replace(
            vec![
                derived("Low", "BOS", 12.0, SafePick::NoPick),
                derived("High", "LAL", 31.0, SafePick::NoPick),
                derived("Mid", "MIL", 22.0, SafePick::NoPick),
            ],
            vec![],
        );
        let names: Vec<String> =
            store.all_players().into_iter().map(|r| r.player.name).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn picks_excludes_no_pick_and_sorts_by_line() {
        let store = SnapshotStore::new();
        store.replace(
            vec![
                derived("NoPick", "BOS", 10.0, SafePick::NoPick),
                derived("Small", "LAL", 18.0, SafePick::Over(11.5)),
                derived("Big", "MIL", 30.0, SafePick::Over(20.5)),
            ],
            vec![],
        );
        let picks = store.picks();
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].player.name, "Big");
        assert_eq!(picks[1].player.name, "Small");
    }

    #[test]
    fn fresh_store_is_stale_until_first_replace() {
        let store = SnapshotStore::new();
        assert!(store.is_stale(600));
        assert!(store.age_secs().is_none());

        store.replace(vec![], vec![]);
        assert!(!store.is_stale(600));
        assert_eq!(store.age_secs(), Some(0));
    }

    #[test]
    fn concurrent_readers_never_see_a_partial_table() {
        let table = |gen: usize| -> Vec<DerivedRow> {
            (0..1000)
                .map(|i| derived(&format!("P{gen}-{i}"), "BOS", 20.0, SafePick::NoPick))
                .collect()
        };

        let store = SnapshotStore::new();
        store.replace(table(0), vec![]);

        let reader = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..2000 {
                    let count = store.player_count();
                    assert_eq!(count, 1000, "observed a partially-replaced snapshot");
                }
            })
        };

        for gen in 1..=20 {
            store.replace(table(gen), vec![]);
        }
        reader.join().unwrap();
    }
}
