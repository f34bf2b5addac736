use crate::*;
pub use random::*;

mod random;

/// Source of the tiles that appear after every effective swipe.
pub trait TileSpawner {
    /// Places one tile on an empty cell, returning where and what was placed.
    ///
    /// Does nothing on a full board.
    fn spawn(&mut self, board: &mut Board) -> Option<(Coord2, Tile)>;
}

/// Cumulative spawn distribution: `2` below 0.6, `4` below 0.9, `8` otherwise.
pub const SPAWN_THRESHOLDS: [(f64, Tile); 2] = [(0.6, 2), (0.9, 4)];

/// Tile produced for a uniform draw in `[0, 1)`.
pub fn tile_for_draw(draw: f64) -> Tile {
    SPAWN_THRESHOLDS
        .iter()
        .find(|&&(threshold, _)| draw < threshold)
        .map_or(8, |&(_, tile)| tile)
}
