use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use merge1024_core::StatsSink;
use merge1024_protocol::{GameStats, PlayerId, PlayerProfile, StatsOrder, StatsUpload};
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub profile: PlayerProfile,
    pub games: Vec<GameStats>,
}

impl PlayerRecord {
    fn new(player: PlayerId) -> Self {
        Self {
            profile: PlayerProfile::empty(player),
            games: Vec::new(),
        }
    }
}

/// All recorded sessions, grouped by player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsStore {
    players: BTreeMap<PlayerId, PlayerRecord>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a store from `path`; a missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("no stats file at {}, starting empty", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Appends a session and recomputes the player's aggregates from their
    /// full history.
    pub fn record(&mut self, upload: StatsUpload) -> &PlayerProfile {
        let StatsUpload { player, stats } = upload;
        let record = self
            .players
            .entry(player.clone())
            .or_insert_with(|| PlayerRecord::new(player.clone()));

        record.games.push(stats);
        record.profile = PlayerProfile::from_history(player, &record.games);
        log::debug!(
            "{} now has {} games, {:.1} steps on average",
            record.profile.player,
            record.profile.total_games,
            record.profile.average_steps
        );
        &record.profile
    }

    pub fn profile(&self, player: &PlayerId) -> Option<&PlayerProfile> {
        self.players.get(player).map(|record| &record.profile)
    }

    /// The player's sessions in the requested order; empty for unknown players.
    pub fn history(&self, player: &PlayerId, order: StatsOrder) -> Vec<GameStats> {
        let mut games = self
            .players
            .get(player)
            .map(|record| record.games.clone())
            .unwrap_or_default();
        order.sort(&mut games);
        games
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.keys()
    }
}

impl StatsSink for StatsStore {
    fn submit(&mut self, upload: StatsUpload) {
        self.record(upload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(player: &str, steps: u32, timestamp_ms: i64) -> StatsUpload {
        StatsUpload {
            player: PlayerId::new(player),
            stats: GameStats {
                steps,
                board_size: 4,
                won: steps > 100,
                max_score: 128,
                timestamp_ms,
                play_time_seconds: 60,
            },
        }
    }

    #[test]
    fn record_recomputes_profile_from_history() {
        let mut store = StatsStore::new();

        store.record(upload("ann", 10, 1));
        let profile = store.record(upload("ann", 30, 2)).clone();

        assert_eq!(profile.total_games, 2);
        assert!((profile.average_steps - 20.0).abs() < f64::EPSILON);
        assert_eq!(store.profile(&PlayerId::new("ann")), Some(&profile));
    }

    #[test]
    fn players_are_kept_apart() {
        let mut store = StatsStore::new();

        store.record(upload("ann", 10, 1));
        store.record(upload("bob", 50, 2));

        assert_eq!(store.history(&PlayerId::new("ann"), StatsOrder::Newest).len(), 1);
        assert_eq!(store.profile(&PlayerId::new("bob")).map(|p| p.total_games), Some(1));
        assert_eq!(store.players().count(), 2);
    }

    #[test]
    fn history_is_sorted_on_request() {
        let mut store = StatsStore::new();
        store.record(upload("ann", 30, 1));
        store.record(upload("ann", 10, 3));
        store.record(upload("ann", 20, 2));
        let ann = PlayerId::new("ann");

        let newest: Vec<_> = store.history(&ann, StatsOrder::Newest).iter().map(|g| g.timestamp_ms).collect();
        let fewest: Vec<_> = store.history(&ann, StatsOrder::StepsAscending).iter().map(|g| g.steps).collect();

        assert_eq!(newest, vec![3, 2, 1]);
        assert_eq!(fewest, vec![10, 20, 30]);
    }

    #[test]
    fn unknown_player_has_no_profile() {
        let store = StatsStore::new();
        let nobody = PlayerId::new("nobody");

        assert_eq!(store.profile(&nobody), None);
        assert!(store.history(&nobody, StatsOrder::Newest).is_empty());
    }

    #[test]
    fn save_and_load_keep_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stats.json");
        let mut store = StatsStore::new();
        store.record(upload("ann", 12, 5));

        store.save(&path).unwrap();
        let loaded = StatsStore::load(&path).unwrap();

        assert_eq!(loaded, store);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();

        let store = StatsStore::load(dir.path().join("absent.json")).unwrap();

        assert_eq!(store, StatsStore::default());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(StatsStore::load(&path), Err(StoreError::Json(_))));
    }
}
