//! Records exchanged between the game engine and the stats backend.
//!
//! Field names on the wire are camelCase to stay compatible with the stored
//! player documents (`boardSize`, `maxScore`, `playTimeSeconds`, ...).

use core::cmp::Reverse;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identity of a signed-in player, as issued by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Summary of one finished session. Produced once, when a game is won or lost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Number of swipes that changed the board.
    pub steps: u32,
    pub board_size: u8,
    pub won: bool,
    /// Largest tile on the board when the session ended.
    pub max_score: u32,
    /// Wall-clock end of the session, milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub play_time_seconds: u64,
}

/// A stats record addressed to the player it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpload {
    pub player: PlayerId,
    pub stats: GameStats,
}

/// Aggregate fields kept on the player document.
///
/// Both values are derived from the full game history, never incremented in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    #[serde(rename = "uid")]
    pub player: PlayerId,
    pub total_games: u32,
    pub average_steps: f64,
}

impl PlayerProfile {
    pub fn empty(player: PlayerId) -> Self {
        Self {
            player,
            total_games: 0,
            average_steps: 0.0,
        }
    }

    pub fn from_history(player: PlayerId, games: &[GameStats]) -> Self {
        let total_games = games.len();
        if total_games == 0 {
            return Self::empty(player);
        }

        let total_steps: u64 = games.iter().map(|game| u64::from(game.steps)).sum();
        Self {
            player,
            total_games: total_games.try_into().unwrap_or(u32::MAX),
            average_steps: total_steps as f64 / total_games as f64,
        }
    }
}

/// Orderings offered when listing a player's history.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsOrder {
    /// Most recent first.
    #[default]
    Newest,
    StepsAscending,
    StepsDescending,
}

impl StatsOrder {
    pub fn sort(self, games: &mut [GameStats]) {
        match self {
            Self::Newest => games.sort_by_key(|game| Reverse(game.timestamp_ms)),
            Self::StepsAscending => games.sort_by_key(|game| game.steps),
            Self::StepsDescending => games.sort_by_key(|game| Reverse(game.steps)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort order {0:?}, expected newest, steps-asc or steps-desc")]
pub struct UnknownStatsOrder(pub String);

impl FromStr for StatsOrder {
    type Err = UnknownStatsOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "date" => Ok(Self::Newest),
            "steps-asc" => Ok(Self::StepsAscending),
            "steps-desc" => Ok(Self::StepsDescending),
            other => Err(UnknownStatsOrder(other.to_owned())),
        }
    }
}
