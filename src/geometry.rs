//! Conversions between (row, col) coordinates and 1D cell indices.
//!
//! Rows and columns are 1-indexed over the playable area; row 0, column 0,
//! row N + 1 and column N + 1 form the border.

use crate::constants::{BOARDSIZE, DELTA, N, W};

/// A cell of the padded board, represented as an index into the 1D array.
pub type Point = usize;

/// Index of the cell at (row, col) of the padded grid.
#[inline]
pub const fn to_index(row: usize, col: usize) -> Point {
    W * row + col
}

/// (row, col) of the cell at `pt`. Inverse of [`to_index`].
#[inline]
pub const fn from_index(pt: Point) -> (usize, usize) {
    (pt / W, pt % W)
}

/// Whether `pt` is a playable cell (inside the border).
#[inline]
pub fn on_board(pt: Point) -> bool {
    if pt >= BOARDSIZE {
        return false;
    }
    let (row, col) = from_index(pt);
    (1..=N).contains(&row) && (1..=N).contains(&col)
}

/// The cell `k` steps from `pt` along direction `delta`.
///
/// Only meaningful while the walk stays inside the padded grid, which the
/// occupied border guarantees for scans that stop at the first blocked cell.
#[inline]
pub fn step(pt: Point, delta: isize, k: isize) -> Point {
    (pt as isize + delta * k) as usize
}

/// All 8 neighbors of a point, in [`DELTA`] order.
#[inline]
pub fn neighbors(pt: Point) -> [Point; 8] {
    std::array::from_fn(|i| step(pt, DELTA[i], 1))
}

/// Direction from `start` to `end` and the number of steps between them, if
/// the two cells lie on a common row, column or diagonal.
pub fn queen_line(start: Point, end: Point) -> Option<(isize, usize)> {
    let (r0, c0) = from_index(start);
    let (r1, c1) = from_index(end);
    let dr = r1 as isize - r0 as isize;
    let dc = c1 as isize - c0 as isize;

    if dr == 0 && dc == 0 {
        return None;
    }
    if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
        return None;
    }

    let delta = dr.signum() * W as isize + dc.signum();
    let dist = dr.unsigned_abs().max(dc.unsigned_abs());
    Some((delta, dist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOARD_IMAX, BOARD_IMIN};

    #[test]
    fn test_index_roundtrip() {
        for row in 0..W {
            for col in 0..W {
                assert_eq!(from_index(to_index(row, col)), (row, col));
            }
        }
    }

    #[test]
    fn test_playable_range() {
        assert_eq!(BOARD_IMIN, to_index(1, 1));
        assert_eq!(BOARD_IMAX - 1, to_index(N, N));
        assert!(!on_board(to_index(0, 3)));
        assert!(!on_board(to_index(3, 0)));
        assert!(!on_board(to_index(N + 1, 3)));
        assert!(!on_board(to_index(3, N + 1)));
        assert!(!on_board(BOARDSIZE));
        assert!(on_board(to_index(N, 1)));
    }

    #[test]
    fn test_queen_line() {
        let a = to_index(2, 2);
        assert_eq!(queen_line(a, a), None);
        assert_eq!(queen_line(a, to_index(2, 5)), Some((1, 3)));
        assert_eq!(queen_line(a, to_index(5, 2)), Some((W as isize, 3)));
        assert_eq!(queen_line(a, to_index(4, 4)), Some((W as isize + 1, 2)));
        assert_eq!(queen_line(to_index(4, 4), a), Some((-(W as isize) - 1, 2)));
        assert_eq!(queen_line(to_index(1, 3), to_index(3, 1)), Some((W as isize - 1, 2)));
        // knight jump
        assert_eq!(queen_line(a, to_index(3, 4)), None);
    }

    #[test]
    fn test_neighbors_center() {
        let pt = to_index(3, 3);
        let around = neighbors(pt);
        for (i, n) in around.iter().enumerate() {
            let (r, c) = from_index(*n);
            assert!(r.abs_diff(3) <= 1 && c.abs_diff(3) <= 1, "neighbor {i} at ({r},{c})");
            assert_ne!(*n, pt);
        }
    }
}
