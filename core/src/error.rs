use thiserror::Error;

use crate::{BoardSize, GameState, Tile};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board size {0} is out of range, expected 3 to 7")]
    InvalidBoardSize(BoardSize),
    #[error("Target sum {0} must be a positive power of two")]
    InvalidTargetSum(Tile),
    #[error("Tile value {0} is neither empty nor a power of two")]
    InvalidTile(Tile),
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Saved state {0:?} does not match the board")]
    StateMismatch(GameState),
    #[error("Unknown direction")]
    InvalidDirection,
}

pub type Result<T> = core::result::Result<T, GameError>;
