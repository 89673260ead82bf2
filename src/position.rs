//! Amazons position representation and move execution.
//!
//! This module provides the core game logic:
//! - Board state as three bitsets over the padded grid (occupied cells and
//!   each side's amazons)
//! - Queen-line connectivity with the border acting as a sentinel
//! - Move legality, application, enumeration and fast counting
//!
//! Legality checks never mutate the position. Where the rules need the board
//! "as if the amazon had already left", the check runs against a copy of the
//! occupancy bitset with the origin cleared (see [`BitSet::without`]).

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::bitset::{self, BitSet};
use crate::constants::{BOARDSIZE, BORDER_CELLS, DELTA, N, START_A, START_B};
use crate::geometry::{Point, from_index, neighbors, on_board, queen_line, step, to_index};

/// One of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Moves first.
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Side> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Side::A),
            "b" => Ok(Side::B),
            other => bail!("unknown side '{other}', expected 'a' or 'b'"),
        }
    }
}

/// Classification of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tile {
    Open,
    Burnt,
    Amazon(Side),
}

impl Tile {
    /// Character used for this tile in text grids.
    pub fn icon(self) -> char {
        match self {
            Tile::Open => '.',
            Tile::Burnt => 'X',
            Tile::Amazon(Side::A) => '@',
            Tile::Amazon(Side::B) => 'O',
        }
    }
}

/// A complete turn: move an amazon from `from` to `to`, then shoot an arrow
/// from `to` at `arrow`.
///
/// A `Move` is plain data; whether it is legal depends on the position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Point,
    pub to: Point,
    pub arrow: Point,
}

impl Move {
    pub fn new(from: Point, to: Point, arrow: Point) -> Self {
        Self { from, to, arrow }
    }

    /// Build a move from three (row, col) pairs.
    pub fn from_coords(from: (usize, usize), to: (usize, usize), arrow: (usize, usize)) -> Self {
        Self {
            from: to_index(from.0, from.1),
            to: to_index(to.0, to.1),
            arrow: to_index(arrow.0, arrow.1),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r0, c0) = from_index(self.from);
        let (r1, c1) = from_index(self.to);
        let (r2, c2) = from_index(self.arrow);
        write!(f, "{r0},{c0} {r1},{c1} {r2},{c2}")
    }
}

/// Reason a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// One of the three cells is outside the playable area
    OffBoard,
    /// The origin does not hold an amazon of the moving side
    NotOwnPiece,
    /// The amazon cannot slide to its destination
    Unreachable,
    /// The arrow cannot fly from the destination to its target
    ArrowBlocked,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OffBoard => write!(f, "illegal move: square off the board"),
            MoveError::NotOwnPiece => write!(f, "illegal move: no amazon of yours on that square"),
            MoveError::Unreachable => write!(f, "illegal move: amazon cannot reach destination"),
            MoveError::ArrowBlocked => write!(f, "illegal move: arrow cannot reach target"),
        }
    }
}

impl std::error::Error for MoveError {}

/// An Amazons position (board state).
///
/// `occupied` holds border cells, burnt cells and amazons; `amazons_a` and
/// `amazons_b` are disjoint subsets of it. The side to move is not part of
/// the position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    occupied: BitSet,
    amazons_a: BitSet,
    amazons_b: BitSet,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The starting position for the configured board width.
    pub fn new() -> Self {
        let mut pos = Self::empty();
        pos.amazons_a = START_A.iter().map(|&(r, c)| to_index(r, c)).collect();
        pos.amazons_b = START_B.iter().map(|&(r, c)| to_index(r, c)).collect();
        pos.occupied |= pos.amazons_a | pos.amazons_b;
        pos
    }

    /// A board with only the border occupied.
    pub fn empty() -> Self {
        Self {
            occupied: (0..BOARDSIZE).filter(|&pt| !on_board(pt)).collect(),
            amazons_a: BitSet::new(),
            amazons_b: BitSet::new(),
        }
    }

    /// Build an arbitrary position from amazon and burnt cell lists.
    ///
    /// # Errors
    /// Fails if a cell is off the board or listed twice.
    pub fn from_layout(a: &[Point], b: &[Point], burnt: &[Point]) -> Result<Self> {
        let mut pos = Self::empty();
        for (cells, kind) in [(a, Some(Side::A)), (b, Some(Side::B)), (burnt, None)] {
            for &pt in cells {
                if !on_board(pt) {
                    let (r, c) = from_index(pt);
                    bail!("cell {r},{c} is not on the board");
                }
                if pos.occupied.get(pt) {
                    let (r, c) = from_index(pt);
                    bail!("cell {r},{c} is listed twice");
                }
                pos.occupied.set(pt);
                match kind {
                    Some(Side::A) => pos.amazons_a.set(pt),
                    Some(Side::B) => pos.amazons_b.set(pt),
                    None => {}
                }
            }
        }
        Ok(pos)
    }

    #[inline]
    fn amazons(&self, side: Side) -> &BitSet {
        match side {
            Side::A => &self.amazons_a,
            Side::B => &self.amazons_b,
        }
    }

    #[inline]
    fn amazons_mut(&mut self, side: Side) -> &mut BitSet {
        match side {
            Side::A => &mut self.amazons_a,
            Side::B => &mut self.amazons_b,
        }
    }

    /// The occupancy bitset (border, burnt cells and amazons).
    #[inline]
    pub fn occupied(&self) -> &BitSet {
        &self.occupied
    }

    /// Squares holding an amazon of `side`, in index order.
    pub fn pieces(&self, side: Side) -> bitset::Iter {
        self.amazons(side).iter()
    }

    /// Classify a cell. Border cells report as [`Tile::Burnt`].
    pub fn classify(&self, pt: Point) -> Tile {
        if !self.occupied.get(pt) {
            Tile::Open
        } else if self.amazons_a.get(pt) {
            Tile::Amazon(Side::A)
        } else if self.amazons_b.get(pt) {
            Tile::Amazon(Side::B)
        } else {
            Tile::Burnt
        }
    }

    /// The playable area as an NxN grid, row 1 first.
    pub fn grid(&self) -> [[Tile; N]; N] {
        std::array::from_fn(|r| std::array::from_fn(|c| self.classify(to_index(r + 1, c + 1))))
    }

    /// Number of burnt cells (arrows shot so far).
    pub fn burnt_count(&self) -> usize {
        self.occupied.count() - BORDER_CELLS - self.amazons_a.count() - self.amazons_b.count()
    }

    /// Check the structural invariants of the three bitsets.
    pub fn is_consistent(&self) -> bool {
        if self.amazons_a.intersects(&self.amazons_b) {
            return false;
        }
        if !(self.amazons_a | self.amazons_b).is_subset(&self.occupied) {
            return false;
        }
        (0..BOARDSIZE)
            .filter(|&pt| !on_board(pt))
            .all(|pt| self.occupied.get(pt) && !self.amazons_a.get(pt) && !self.amazons_b.get(pt))
    }

    /// Whether a queen could slide from `start` to `end`.
    ///
    /// Every cell after `start` up to and including `end` must be open;
    /// `start` itself is never tested.
    pub fn is_connected(&self, start: Point, end: Point) -> bool {
        start < BOARDSIZE && end < BOARDSIZE && connected(&self.occupied, start, end)
    }

    /// Validate a move for `side` without changing anything.
    ///
    /// The arrow leg is checked with the origin already vacated, so an amazon
    /// may burn the square it just left.
    ///
    /// # Errors
    /// Returns the first rule the move breaks.
    pub fn check_move(&self, side: Side, mv: Move) -> Result<(), MoveError> {
        if !(on_board(mv.from) && on_board(mv.to) && on_board(mv.arrow)) {
            return Err(MoveError::OffBoard);
        }
        if !self.amazons(side).get(mv.from) {
            return Err(MoveError::NotOwnPiece);
        }
        let vacated = self.occupied.without(mv.from);
        if !connected(&vacated, mv.from, mv.to) {
            return Err(MoveError::Unreachable);
        }
        // destination stays open in `vacated`, but a zero-length arrow is
        // rejected by `connected`
        if !connected(&vacated, mv.to, mv.arrow) {
            return Err(MoveError::ArrowBlocked);
        }
        Ok(())
    }

    #[inline]
    pub fn is_legal(&self, side: Side, mv: Move) -> bool {
        self.check_move(side, mv).is_ok()
    }

    /// Play a move for `side`.
    ///
    /// # Errors
    /// Leaves the position untouched and returns the reason if the move is
    /// illegal.
    pub fn make_move(&mut self, side: Side, mv: Move) -> Result<(), MoveError> {
        self.check_move(side, mv)?;

        let amazons = self.amazons_mut(side);
        amazons.clear(mv.from);
        amazons.set(mv.to);
        self.occupied.clear(mv.from);
        self.occupied.set(mv.to);
        self.occupied.set(mv.arrow);
        Ok(())
    }

    /// A copy of this position with `mv` played.
    ///
    /// # Panics
    /// If `mv` is not legal for `side`; callers only pass generated moves.
    pub fn with_move(&self, side: Side, mv: Move) -> Position {
        let mut next = self.clone();
        if let Err(e) = next.make_move(side, mv) {
            panic!("with_move called with illegal move {mv} for side {side}: {e}");
        }
        next
    }

    /// Every square a queen on `pt` could slide to, direction by direction,
    /// nearest first. `pt` must be a playable cell.
    pub fn reachable_from(&self, pt: Point) -> Vec<Point> {
        rays(&self.occupied, pt).collect()
    }

    /// Same as `reachable_from(pt).len()`, without allocating.
    pub fn count_queen_connections(&self, pt: Point) -> usize {
        count_rays(&self.occupied, pt)
    }

    /// Number of (destination, arrow) pairs open to an amazon on `pt`.
    pub fn count_piece_moves(&self, pt: Point) -> usize {
        let vacated = self.occupied.without(pt);
        rays(&vacated, pt).map(|to| count_rays(&vacated, to)).sum()
    }

    /// Number of legal moves for `side`. Always equals
    /// `enumerate_moves(side).len()`.
    pub fn count_legal_moves(&self, side: Side) -> usize {
        self.pieces(side).map(|pt| self.count_piece_moves(pt)).sum()
    }

    /// All legal moves for `side`, ordered by amazon, then destination, then
    /// arrow.
    pub fn enumerate_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::new();
        for from in self.pieces(side) {
            let vacated = self.occupied.without(from);
            for to in rays(&vacated, from) {
                moves.extend(rays(&vacated, to).map(|arrow| Move { from, to, arrow }));
            }
        }
        moves
    }

    /// Whether `side` is out of moves.
    ///
    /// An amazon with any open neighbor can always step there and burn the
    /// square it left, so checking neighbors is exact.
    pub fn has_no_moves(&self, side: Side) -> bool {
        self.pieces(side)
            .all(|pt| neighbors(pt).iter().all(|&n| self.occupied.get(n)))
    }
}

/// Whether every cell after `start` up to and including `end` is open, with
/// both on a common queen line.
fn connected(occupied: &BitSet, start: Point, end: Point) -> bool {
    let Some((delta, dist)) = queen_line(start, end) else {
        return false;
    };
    (1..=dist as isize).all(|k| !occupied.get(step(start, delta, k)))
}

/// Open cells visible from `from` along the 8 queen directions.
fn rays(occupied: &BitSet, from: Point) -> impl Iterator<Item = Point> + '_ {
    DELTA.iter().flat_map(move |&d| {
        (1..)
            .map(move |k| step(from, d, k))
            .take_while(move |&pt| !occupied.get(pt))
    })
}

fn count_rays(occupied: &BitSet, from: Point) -> usize {
    let mut count = 0;
    for &d in &DELTA {
        let mut k = 1;
        while !occupied.get(step(from, d, k)) {
            k += 1;
        }
        count += (k - 1) as usize;
    }
    count
}

/// Text grid: one row per line, `.` open, `X` burnt, `@` side A, `O` side B.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid() {
            let line: Vec<String> = row.iter().map(|t| t.icon().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    /// Parse the [`Display`](fmt::Display) format. Whitespace inside a row is
    /// ignored, blank lines are skipped, and `#` is accepted for burnt cells.
    fn from_str(s: &str) -> Result<Position> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != N {
            bail!("expected {N} rows, found {}", rows.len());
        }

        let (mut a, mut b, mut burnt) = (Vec::new(), Vec::new(), Vec::new());
        for (r, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != N {
                bail!("row {} has {} cells, expected {N}", r + 1, cells.len());
            }
            for (c, ch) in cells.into_iter().enumerate() {
                let pt = to_index(r + 1, c + 1);
                match ch {
                    '.' => {}
                    'X' | 'x' | '#' => burnt.push(pt),
                    '@' => a.push(pt),
                    'O' | 'o' => b.push(pt),
                    other => bail!("row {}: unexpected character '{other}'", r + 1),
                }
            }
        }
        Position::from_layout(&a, &b, &burnt).context("invalid board layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(r: usize, c: usize) -> Point {
        to_index(r, c)
    }

    #[test]
    fn test_new_position() {
        let pos = Position::new();
        assert!(pos.is_consistent());
        for &(r, c) in START_A {
            assert_eq!(pos.classify(pt(r, c)), Tile::Amazon(Side::A));
        }
        for &(r, c) in START_B {
            assert_eq!(pos.classify(pt(r, c)), Tile::Amazon(Side::B));
        }
        assert_eq!(pos.burnt_count(), 0);
        assert_eq!(pos.occupied().count(), BORDER_CELLS + START_A.len() + START_B.len());
    }

    #[test]
    fn test_border_is_burnt() {
        let pos = Position::new();
        assert_eq!(pos.classify(pt(0, 0)), Tile::Burnt);
        assert_eq!(pos.classify(pt(N + 1, 3)), Tile::Burnt);
        assert_eq!(pos.classify(pt(3, N + 1)), Tile::Burnt);
    }

    #[test]
    fn test_is_connected_basic() {
        let pos = Position::from_layout(&[pt(2, 2)], &[pt(2, 5)], &[pt(4, 4)]).unwrap();
        let a = pt(2, 2);
        assert!(!pos.is_connected(a, a), "same square");
        assert!(pos.is_connected(a, pt(2, 4)));
        assert!(!pos.is_connected(a, pt(2, 5)), "end square occupied");
        assert!(!pos.is_connected(a, pt(2, 6)), "path through amazon");
        assert!(pos.is_connected(a, pt(3, 3)));
        assert!(!pos.is_connected(a, pt(4, 4)), "burnt end");
        assert!(!pos.is_connected(a, pt(5, 5)), "burnt on path");
        assert!(!pos.is_connected(a, pt(3, 4)), "not a straight line");
        assert!(!pos.is_connected(a, pt(0, 2)), "border");
    }

    #[test]
    fn test_check_move_errors() {
        let pos = Position::from_layout(&[pt(2, 2)], &[pt(2, 5)], &[pt(4, 4)]).unwrap();
        let off = Move::new(pt(2, 2), pt(2, 3), pt(0, 3));
        assert_eq!(pos.check_move(Side::A, off), Err(MoveError::OffBoard));

        let wrong = Move::from_coords((2, 5), (3, 5), (3, 6));
        assert_eq!(pos.check_move(Side::A, wrong), Err(MoveError::NotOwnPiece));
        assert_eq!(pos.check_move(Side::B, wrong), Ok(()));

        let blocked = Move::from_coords((2, 2), (5, 5), (5, 6));
        assert_eq!(pos.check_move(Side::A, blocked), Err(MoveError::Unreachable));

        let arrow_blocked = Move::from_coords((2, 2), (2, 3), (2, 6));
        assert_eq!(pos.check_move(Side::A, arrow_blocked), Err(MoveError::ArrowBlocked));
    }

    #[test]
    fn test_arrow_may_burn_origin() {
        let pos = Position::from_layout(&[pt(2, 2)], &[pt(5, 5)], &[]).unwrap();
        let mv = Move::from_coords((2, 2), (2, 4), (2, 2));
        assert!(pos.is_legal(Side::A, mv));

        // and may fly over it
        let mv = Move::from_coords((2, 2), (2, 3), (2, 1));
        assert!(pos.is_legal(Side::A, mv));
    }

    #[test]
    fn test_arrow_cannot_hit_destination() {
        let pos = Position::from_layout(&[pt(2, 2)], &[pt(5, 5)], &[]).unwrap();
        let mv = Move::from_coords((2, 2), (2, 4), (2, 4));
        assert_eq!(pos.check_move(Side::A, mv), Err(MoveError::ArrowBlocked));
    }

    #[test]
    fn test_make_move_updates_sets() {
        let mut pos = Position::from_layout(&[pt(2, 2)], &[pt(5, 5)], &[]).unwrap();
        let mv = Move::from_coords((2, 2), (2, 4), (2, 2));
        assert_eq!(pos.make_move(Side::A, mv), Ok(()));
        assert_eq!(pos.classify(pt(2, 4)), Tile::Amazon(Side::A));
        assert_eq!(pos.classify(pt(2, 2)), Tile::Burnt);
        assert_eq!(pos.burnt_count(), 1);
        assert!(pos.is_consistent());
    }

    #[test]
    fn test_rejected_move_leaves_position() {
        let mut pos = Position::new();
        let before = pos.clone();
        let first = pos.pieces(Side::A).next().unwrap();
        let mv = Move::new(first, first, first);
        assert!(pos.make_move(Side::A, mv).is_err());
        assert!(pos.make_move(Side::B, Move::new(first, first + 1, first)).is_err());
        assert_eq!(pos, before);
    }

    #[test]
    #[should_panic(expected = "illegal move")]
    fn test_with_move_panics_on_illegal() {
        let pos = Position::new();
        let first = pos.pieces(Side::B).next().unwrap();
        let _ = pos.with_move(Side::A, Move::new(first, first + 1, first));
    }

    #[test]
    fn test_with_move_leaves_original() {
        let pos = Position::new();
        let mv = pos.enumerate_moves(Side::A)[0];
        let next = pos.with_move(Side::A, mv);
        assert_eq!(pos, Position::new());
        assert_ne!(next, pos);
        assert_eq!(next.burnt_count(), 1);
    }

    #[test]
    fn test_reachable_matches_count() {
        let pos = Position::new();
        for row in 1..=N {
            for col in 1..=N {
                let p = pt(row, col);
                assert_eq!(pos.reachable_from(p).len(), pos.count_queen_connections(p));
            }
        }
    }

    #[test]
    fn test_reachable_order() {
        let pos = Position::from_layout(&[pt(1, 1)], &[pt(N, N)], &[pt(1, 3), pt(3, 1)]).unwrap();
        // E then S then SE (DELTA order), nearest first
        let mut expected = vec![pt(1, 2), pt(2, 1)];
        expected.extend((2..N).map(|k| pt(k, k)));
        assert_eq!(pos.reachable_from(pt(1, 1)), expected);
    }

    #[test]
    fn test_count_matches_enumeration_initial() {
        let pos = Position::new();
        for side in Side::BOTH {
            assert_eq!(pos.count_legal_moves(side), pos.enumerate_moves(side).len());
        }
    }

    #[test]
    fn test_enumerated_moves_are_legal_and_distinct() {
        let pos = Position::new();
        let moves = pos.enumerate_moves(Side::B);
        let unique: std::collections::HashSet<_> = moves.iter().collect();
        assert_eq!(unique.len(), moves.len());
        assert!(moves.iter().all(|&m| pos.is_legal(Side::B, m)));
        assert!(moves.iter().any(|m| m.arrow == m.from));
    }

    #[test]
    fn test_has_no_moves() {
        let pos = Position::from_layout(
            &[pt(N, N)],
            &[pt(1, 1)],
            &[pt(1, 2), pt(2, 1), pt(2, 2)],
        )
        .unwrap();
        assert!(pos.has_no_moves(Side::B));
        assert!(!pos.has_no_moves(Side::A));
        assert!(pos.enumerate_moves(Side::B).is_empty());
        assert_eq!(pos.count_legal_moves(Side::B), 0);
    }

    #[test]
    fn test_from_layout_rejects_bad_cells() {
        assert!(Position::from_layout(&[pt(0, 1)], &[], &[]).is_err());
        assert!(Position::from_layout(&[pt(1, 1)], &[pt(1, 1)], &[]).is_err());
    }

    #[test]
    fn test_text_grid_roundtrip() {
        let pos = Position::new().with_move(Side::A, Position::new().enumerate_moves(Side::A)[7]);
        let text = pos.to_string();
        let parsed: Position = text.parse().unwrap();
        assert_eq!(parsed, pos);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!("@ . .".parse::<Position>().is_err());
        let mut text = Position::new().to_string();
        text = text.replacen('.', "?", 1);
        assert!(text.parse::<Position>().is_err());
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("a".parse::<Side>().unwrap(), Side::A);
        assert_eq!(" B ".parse::<Side>().unwrap(), Side::B);
        assert!("c".parse::<Side>().is_err());
        assert_eq!(Side::A.opponent(), Side::B);
    }
}
