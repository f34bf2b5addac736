use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Spawner that picks a uniformly random empty cell and draws the value from
/// the fixed 2/4/8 distribution.
#[derive(Clone, Debug)]
pub struct RandomTileSpawner {
    rng: SmallRng,
}

impl RandomTileSpawner {
    /// Deterministic spawner, used for replays and tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Spawner seeded from the wall clock.
    pub fn from_time() -> Self {
        Self::from_seed(time_seed())
    }
}

impl TileSpawner for RandomTileSpawner {
    fn spawn(&mut self, board: &mut Board) -> Option<(Coord2, Tile)> {
        let empty_cells = board.empty_cells();
        if empty_cells.is_empty() {
            log::warn!("No empty cell left to spawn into");
            return None;
        }

        let coords = empty_cells[self.rng.random_range(0..empty_cells.len())];
        let tile = tile_for_draw(self.rng.random::<f64>());
        board.set_tile(coords, tile);
        log::debug!("spawned {} at {:?}", tile, coords);
        Some((coords, tile))
    }
}

fn time_seed() -> u64 {
    use web_time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_thresholds_follow_distribution() {
        assert_eq!(tile_for_draw(0.0), 2);
        assert_eq!(tile_for_draw(0.599), 2);
        assert_eq!(tile_for_draw(0.6), 4);
        assert_eq!(tile_for_draw(0.899), 4);
        assert_eq!(tile_for_draw(0.9), 8);
        assert_eq!(tile_for_draw(0.999), 8);
    }

    #[test]
    fn spawn_fills_exactly_one_empty_cell() {
        let mut board = Board::new(3);
        let mut spawner = RandomTileSpawner::from_seed(7);

        let (coords, tile) = spawner.spawn(&mut board).unwrap();

        assert_eq!(board.occupied_count(), 1);
        assert_eq!(board.tile_at(coords), tile);
        assert!(matches!(tile, 2 | 4 | 8));
    }

    #[test]
    fn spawn_on_full_board_is_a_no_op() {
        let mut board = Board::from_rows(&[[2, 4, 2], [4, 2, 4], [2, 4, 2]]).unwrap();
        let before = board.clone();

        assert_eq!(RandomTileSpawner::from_seed(1).spawn(&mut board), None);
        assert_eq!(board, before);
    }

    #[test]
    fn same_seed_spawns_same_tiles() {
        let mut first = Board::new(5);
        let mut second = Board::new(5);
        let mut a = RandomTileSpawner::from_seed(42);
        let mut b = RandomTileSpawner::from_seed(42);

        for _ in 0..10 {
            assert_eq!(a.spawn(&mut first), b.spawn(&mut second));
        }
        assert_eq!(first, second);
    }

    #[test]
    fn spawned_values_are_spread_over_all_three_tiles() {
        let mut spawner = RandomTileSpawner::from_seed(3);
        let mut seen = [false; 3];

        for _ in 0..200 {
            let mut board = Board::new(3);
            let (_, tile) = spawner.spawn(&mut board).unwrap();
            seen[tile.trailing_zeros() as usize - 1] = true;
        }

        assert_eq!(seen, [true; 3]);
    }
}
