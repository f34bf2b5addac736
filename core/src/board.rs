use core::fmt;
use ndarray::{Array2, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};

use crate::*;

/// Square grid of tiles, indexed as `(row, col)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Tile>,
}

impl Board {
    /// Empty `size × size` board.
    pub fn new(size: BoardSize) -> Self {
        let size = usize::from(size);
        Self {
            cells: Array2::zeros((size, size)),
        }
    }

    /// Builds a board from explicit rows, validating shape and tile values.
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self> {
        let size: BoardSize = rows
            .len()
            .try_into()
            .map_err(|_| GameError::InvalidBoardShape)?;
        if !is_valid_board_size(size) {
            return Err(GameError::InvalidBoardSize(size));
        }

        let mut board = Self::new(size);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != rows.len() {
                return Err(GameError::InvalidBoardShape);
            }
            for (col_index, &tile) in row.iter().enumerate() {
                if tile != 0 && !is_power_of_two(tile) {
                    return Err(GameError::InvalidTile(tile));
                }
                board.cells[[row_index, col_index]] = tile;
            }
        }
        Ok(board)
    }

    /// Whether the board is square, of a playable size, and holds only
    /// empty cells or powers of two. Deserialized boards are not checked.
    pub fn is_valid(&self) -> bool {
        let (rows, cols) = self.cells.dim();
        rows == cols
            && BoardSize::try_from(rows).is_ok_and(is_valid_board_size)
            && self
                .cells
                .iter()
                .all(|&tile| tile == 0 || is_power_of_two(tile))
    }

    pub fn size(&self) -> BoardSize {
        self.cells.nrows().try_into().unwrap_or(BoardSize::MAX)
    }

    pub fn tile_at(&self, coords: Coord2) -> Tile {
        self.cells[coords.to_nd_index()]
    }

    pub(crate) fn set_tile(&mut self, coords: Coord2, tile: Tile) {
        self.cells[coords.to_nd_index()] = tile;
    }

    /// Coordinates of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> Vec<Coord2> {
        self.cells
            .indexed_iter()
            .filter(|&(_, &tile)| tile == 0)
            .map(|((row, col), _)| (row as u8, col as u8))
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&tile| tile != 0).count()
    }

    pub fn max_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Whether two orthogonally adjacent cells hold the same mergeable value.
    pub fn has_adjacent_pair(&self) -> bool {
        self.cells.indexed_iter().any(|((row, col), &tile)| {
            merged_value(tile).is_some()
                && self
                    .cells
                    .iter_neighbors((row as u8, col as u8))
                    .any(|pos| self.cells[pos.to_nd_index()] == tile)
        })
    }

    /// Whether some swipe would still change the board.
    pub fn can_move(&self) -> bool {
        self.cells.iter().any(|&tile| tile == 0) || self.has_adjacent_pair()
    }

    /// Compacts and merges every line toward `direction`.
    ///
    /// Returns whether any cell changed.
    pub fn slide(&mut self, direction: Direction) -> bool {
        let before = self.cells.clone();

        match direction {
            Direction::Left => self.cells.rows_mut().into_iter().for_each(merge_lane),
            Direction::Up => self.cells.columns_mut().into_iter().for_each(merge_lane),
            Direction::Right => self
                .cells
                .rows_mut()
                .into_iter()
                .map(reversed)
                .for_each(merge_lane),
            Direction::Down => self
                .cells
                .columns_mut()
                .into_iter()
                .map(reversed)
                .for_each(merge_lane),
        }

        self.cells != before
    }

    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.cells.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

fn reversed(mut lane: ArrayViewMut1<'_, Tile>) -> ArrayViewMut1<'_, Tile> {
    lane.invert_axis(Axis(0));
    lane
}

/// Runs [`merge_line`] over a lane whose index 0 is the leading edge.
fn merge_lane(mut lane: ArrayViewMut1<'_, Tile>) {
    let merged = merge_line(&lane.to_vec());
    for (cell, tile) in lane.iter_mut().zip(merged) {
        *cell = tile;
    }
}

/// Compacts `line` toward index 0 and merges equal neighbours.
///
/// The scan starts at index 0 and skips past a freshly merged tile, so every
/// tile takes part in at most one merge: `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]`.
/// Pairs whose sum does not fit a [`Tile`] stay apart.
pub fn merge_line(line: &[Tile]) -> Vec<Tile> {
    let mut tiles = line.iter().copied().filter(|&tile| tile != 0).peekable();
    let mut merged = Vec::with_capacity(line.len());

    while let Some(tile) = tiles.next() {
        if let Some(doubled) = merged_value(tile)
            && tiles.next_if_eq(&tile).is_some()
        {
            merged.push(doubled);
        } else {
            merged.push(tile);
        }
    }

    merged.resize(line.len(), 0);
    merged
}

fn merged_value(tile: Tile) -> Option<Tile> {
    tile.checked_mul(2)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().max(1).to_string().len();
        for row in self.cells.rows() {
            let mut first = true;
            for &tile in row {
                if !first {
                    f.write_str(" ")?;
                }
                first = false;
                if tile == 0 {
                    write!(f, "{:>width$}", ".")?;
                } else {
                    write!(f, "{:>width$}", tile)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[[Tile; 4]]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn merge_line_merges_each_pair_once() {
        assert_eq!(merge_line(&[2, 2, 2, 2]), vec![4, 4, 0, 0]);
        assert_eq!(merge_line(&[4, 2, 2, 0]), vec![4, 4, 0, 0]);
        assert_eq!(merge_line(&[2, 2, 2, 0]), vec![4, 2, 0, 0]);
    }

    #[test]
    fn merge_line_compacts_gaps_before_merging() {
        assert_eq!(merge_line(&[2, 0, 0, 2]), vec![4, 0, 0, 0]);
        assert_eq!(merge_line(&[0, 8, 0, 4]), vec![8, 4, 0, 0]);
        assert_eq!(merge_line(&[0, 0, 0, 0]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn slide_left_and_right_scan_from_the_leading_edge() {
        let mut left = board(&[[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let mut right = left.clone();

        assert!(left.slide(Direction::Left));
        assert!(right.slide(Direction::Right));

        assert_eq!(left.to_rows()[0], vec![4, 4, 0, 0]);
        assert_eq!(right.to_rows()[0], vec![0, 0, 4, 4]);
    }

    #[test]
    fn slide_right_prefers_the_pair_nearest_the_right_edge() {
        let mut b = board(&[[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);

        b.slide(Direction::Right);

        assert_eq!(b.to_rows()[0], vec![0, 0, 2, 4]);
    }

    #[test]
    fn slide_up_and_down_work_on_columns() {
        let start = board(&[[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [4, 0, 0, 8]]);
        let mut up = start.clone();
        let mut down = start;

        up.slide(Direction::Up);
        down.slide(Direction::Down);

        assert_eq!(
            up.to_rows(),
            vec![vec![4, 0, 0, 8], vec![8, 0, 0, 0], vec![0; 4], vec![0; 4]]
        );
        assert_eq!(
            down.to_rows(),
            vec![vec![0; 4], vec![0; 4], vec![4, 0, 0, 0], vec![8, 0, 0, 8]]
        );
    }

    #[test]
    fn slide_reports_no_change_for_packed_rows() {
        let mut b = board(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let before = b.clone();

        assert!(!b.slide(Direction::Left));
        assert!(!b.slide(Direction::Right));
        assert_eq!(b, before);
    }

    #[test]
    fn full_board_without_pairs_cannot_move() {
        let b = board(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);

        assert!(b.empty_cells().is_empty());
        assert!(!b.has_adjacent_pair());
        assert!(!b.can_move());
    }

    #[test]
    fn vertical_pair_keeps_board_movable() {
        let b = board(&[[2, 4, 2, 4], [2, 8, 4, 2], [4, 2, 8, 4], [8, 4, 2, 8]]);

        assert!(b.has_adjacent_pair());
        assert!(b.can_move());
    }

    #[test]
    fn largest_tiles_never_merge() {
        const TOP: Tile = 1 << 31;
        assert_eq!(merge_line(&[TOP, TOP, 2, 2]), vec![TOP, TOP, 4, 0]);

        let mut b = Board::from_rows(&[[TOP, TOP, 4], [4, 8, 16], [8, 16, 4]]).unwrap();
        assert!(!b.has_adjacent_pair());
        assert!(!b.can_move());
        assert!(!b.slide(Direction::Left));
        assert!(b.is_valid());
    }

    #[test]
    fn from_rows_rejects_bad_input() {
        assert_eq!(
            Board::from_rows(&[[2, 0], [0, 0]]),
            Err(GameError::InvalidBoardSize(2))
        );
        assert_eq!(
            Board::from_rows(&[vec![0, 0, 0], vec![0, 0], vec![0, 0, 0]]),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(
            Board::from_rows(&[[0, 0, 0], [0, 6, 0], [0, 0, 0]]),
            Err(GameError::InvalidTile(6))
        );
    }

    #[test]
    fn empty_cells_and_max_tile() {
        let b = board(&[[0, 2, 0, 0], [0; 4], [0, 0, 64, 0], [0; 4]]);

        assert_eq!(b.empty_cells().len(), 14);
        assert_eq!(b.occupied_count(), 2);
        assert_eq!(b.max_tile(), 64);
    }
}
