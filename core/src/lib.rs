use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use merge1024_protocol::{GameStats, PlayerId, StatsUpload};
pub use sink::*;
pub use types::*;

mod board;
mod engine;
mod error;
mod generator;
mod sink;
mod types;

/// Board size and winning tile for a game.
///
/// Only valid combinations can be constructed: the size is within `3..=7` and
/// the target is a positive power of two.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SettingsRepr", into = "SettingsRepr")]
pub struct GameSettings {
    board_size: BoardSize,
    target_sum: Tile,
}

impl GameSettings {
    pub const DEFAULT_BOARD_SIZE: BoardSize = 4;
    pub const DEFAULT_TARGET_SUM: Tile = 1024;

    pub fn new(board_size: BoardSize, target_sum: Tile) -> Result<Self> {
        if !is_valid_board_size(board_size) {
            return Err(GameError::InvalidBoardSize(board_size));
        }
        if !is_power_of_two(target_sum) {
            return Err(GameError::InvalidTargetSum(target_sum));
        }
        Ok(Self {
            board_size,
            target_sum,
        })
    }

    pub const fn board_size(&self) -> BoardSize {
        self.board_size
    }

    pub const fn target_sum(&self) -> Tile {
        self.target_sum
    }

    pub fn with_board_size(self, board_size: BoardSize) -> Result<Self> {
        Self::new(board_size, self.target_sum)
    }

    pub fn with_target_sum(self, target_sum: Tile) -> Result<Self> {
        Self::new(self.board_size, target_sum)
    }

    /// Whether switching from `other` to `self` requires a fresh game.
    pub fn changed_from(&self, other: &Self) -> bool {
        self != other
    }

    pub const fn total_cells(&self) -> usize {
        (self.board_size as usize) * (self.board_size as usize)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_size: Self::DEFAULT_BOARD_SIZE,
            target_sum: Self::DEFAULT_TARGET_SUM,
        }
    }
}

#[derive(Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsRepr {
    board_size: BoardSize,
    target_sum: Tile,
}

impl TryFrom<SettingsRepr> for GameSettings {
    type Error = GameError;

    fn try_from(repr: SettingsRepr) -> Result<Self> {
        Self::new(repr.board_size, repr.target_sum)
    }
}

impl From<GameSettings> for SettingsRepr {
    fn from(settings: GameSettings) -> Self {
        Self {
            board_size: settings.board_size,
            target_sum: settings.target_sum,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Self::Up),
            "down" | "s" => Ok(Self::Down),
            "left" | "a" => Ok(Self::Left),
            "right" | "d" => Ok(Self::Right),
            _ => Err(GameError::InvalidDirection),
        }
    }
}

/// Effect of a single swipe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Board unchanged, or the game already ended.
    NoChange,
    Moved,
    Won,
    Lost,
}

impl MoveOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use MoveOutcome::*;
        match self {
            NoChange => false,
            Moved => true,
            Won => true,
            Lost => true,
        }
    }
}
