use ndarray::Array2;

/// Value held by a single cell, `0` when empty.
pub type Tile = u32;

/// Side length of the square board.
pub type BoardSize = u8;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (u8, u8);

pub const MIN_BOARD_SIZE: BoardSize = 3;
pub const MAX_BOARD_SIZE: BoardSize = 7;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn is_power_of_two(value: Tile) -> bool {
    value > 0 && (value & (value - 1)) == 0
}

pub const fn is_valid_board_size(size: BoardSize) -> bool {
    size >= MIN_BOARD_SIZE && size <= MAX_BOARD_SIZE
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        let (rows, cols) = self.dim();
        let bounds = (
            rows.try_into().unwrap_or(u8::MAX),
            cols.try_into().unwrap_or(u8::MAX),
        );
        NeighborIter::new(index, bounds)
    }
}

/// Orthogonal neighbours only: tiles never merge across a diagonal.
const DISPLACEMENTS: [(i8, i8); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *DISPLACEMENTS.get(usize::from(self.index))?;
            self.index += 1;

            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_two_neighbors() {
        let grid: Array2<Tile> = Array2::zeros((3, 3));

        let neighbors: Vec<_> = grid.iter_neighbors((0, 0)).collect();

        assert_eq!(neighbors, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn center_has_four_orthogonal_neighbors() {
        let grid: Array2<Tile> = Array2::zeros((3, 3));

        let neighbors: Vec<_> = grid.iter_neighbors((1, 1)).collect();

        assert_eq!(neighbors, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
    }

    #[test]
    fn power_of_two_check() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(1024));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(12));
    }
}
