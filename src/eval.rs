//! Static evaluation of positions.
//!
//! The score combines two counts, each taken as side A minus side B:
//! - mobility: the number of legal moves
//! - territory: cells reachable by repeated king steps over open squares
//!
//! `evaluate = mobility_diff + ALPHA * territory_diff`. Positive values favor
//! side A. A side that cannot move is scored [`worst_eval`], which lies
//! outside the range of `evaluate`.

use log::debug;

use crate::bitset::BitSet;
use crate::constants::{ALPHA, BIGNUM};
use crate::geometry::neighbors;
use crate::position::{Move, Position, Side};

/// Evaluation terms for both sides, indexed `[A, B]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub mobility: [i32; 2],
    pub territory: [i32; 2],
    pub score: i32,
}

/// Number of legal moves for `side`.
pub fn mobility(pos: &Position, side: Side) -> i32 {
    pos.count_legal_moves(side) as i32
}

/// Cells `side` could reach by moving its amazons one king step at a time
/// over open squares, counting the amazons' own cells.
pub fn territory(pos: &Position, side: Side) -> i32 {
    let occupied = pos.occupied();
    let mut reached: BitSet = pos.pieces(side).collect();
    let mut frontier: Vec<_> = pos.pieces(side).collect();

    while let Some(pt) = frontier.pop() {
        for n in neighbors(pt) {
            if !occupied.get(n) && !reached.get(n) {
                reached.set(n);
                frontier.push(n);
            }
        }
    }

    reached.count() as i32
}

/// Heuristic score of a position. Positive favors A, negative favors B.
pub fn evaluate(pos: &Position) -> i32 {
    let mobility_diff = mobility(pos, Side::A) - mobility(pos, Side::B);
    let territory_diff = territory(pos, Side::A) - territory(pos, Side::B);
    mobility_diff + ALPHA * territory_diff
}

/// Same score as [`evaluate`], with the individual terms.
pub fn evaluate_detailed(pos: &Position) -> Evaluation {
    let mobility = [mobility(pos, Side::A), mobility(pos, Side::B)];
    let territory = [territory(pos, Side::A), territory(pos, Side::B)];
    let score = (mobility[0] - mobility[1]) + ALPHA * (territory[0] - territory[1]);

    debug!(
        "eval: moves A={} B={}, territory A={} B={}, score {}",
        mobility[0], mobility[1], territory[0], territory[1], score
    );

    Evaluation {
        mobility,
        territory,
        score,
    }
}

/// Score of the position reached by `side` playing `mv`.
///
/// # Panics
/// If `mv` is illegal for `side`.
pub fn evaluate_after(pos: &Position, side: Side, mv: Move) -> i32 {
    evaluate(&pos.with_move(side, mv))
}

/// The score of a lost position for `side`.
#[inline]
pub fn worst_eval(side: Side) -> i32 {
    match side {
        Side::A => -BIGNUM,
        Side::B => BIGNUM,
    }
}

/// Whether `eval` is good for `side`. A zero score favors nobody.
#[inline]
pub fn favors(side: Side, eval: i32) -> bool {
    match side {
        Side::A => eval > 0,
        Side::B => eval < 0,
    }
}

/// Best move for `side` by one-ply lookahead, or `None` if it has no moves.
///
/// Ties keep the earliest move in enumeration order.
pub fn greedy_move(pos: &Position, side: Side) -> Option<Move> {
    let mut best: Option<(Move, i32)> = None;

    for mv in pos.enumerate_moves(side) {
        let eval = evaluate_after(pos, side, mv);
        let better = match best {
            None => true,
            Some((_, best_eval)) => match side {
                Side::A => eval > best_eval,
                Side::B => eval < best_eval,
            },
        };
        if better {
            best = Some((mv, eval));
        }
    }

    best.map(|(mv, _)| mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{N, START_A, START_B};
    use crate::geometry::to_index;

    #[test]
    fn test_initial_position_is_balanced() {
        let pos = Position::new();
        // starting layouts are point-symmetric
        assert_eq!(territory(&pos, Side::A), territory(&pos, Side::B));
        assert_eq!(mobility(&pos, Side::A), mobility(&pos, Side::B));
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn test_territory_open_board() {
        let pos = Position::new();
        let pieces = START_A.len() + START_B.len();
        // every open cell plus own amazons
        assert_eq!(territory(&pos, Side::A) as usize, N * N - pieces + START_A.len());
    }

    #[test]
    fn test_territory_walled_off() {
        let pos: Position = {
            let a = [to_index(1, 1)];
            let b = [to_index(N, N)];
            let burnt = [to_index(1, 2), to_index(2, 1), to_index(2, 2)];
            Position::from_layout(&a, &b, &burnt).unwrap()
        };
        assert_eq!(territory(&pos, Side::A), 1);
        assert_eq!(territory(&pos, Side::B) as usize, N * N - 4);
        assert!(evaluate(&pos) < 0);
        assert!(favors(Side::B, evaluate(&pos)));
    }

    #[test]
    fn test_detailed_matches_evaluate() {
        let pos = Position::new();
        let mv = pos.enumerate_moves(Side::A)[3];
        let next = pos.with_move(Side::A, mv);
        let detail = evaluate_detailed(&next);
        assert_eq!(detail.score, evaluate(&next));
        assert_eq!(detail.score, evaluate_after(&pos, Side::A, mv));
        assert_eq!(detail.mobility[1], mobility(&next, Side::B));
    }

    #[test]
    fn test_worst_eval_out_of_range() {
        let pos = Position::new();
        let e = evaluate(&pos);
        assert!(worst_eval(Side::A) < e && e < worst_eval(Side::B));
        assert!(favors(Side::B, worst_eval(Side::A)));
        assert!(favors(Side::A, worst_eval(Side::B)));
        assert!(!favors(Side::A, 0) && !favors(Side::B, 0));
    }

    #[test]
    fn test_greedy_move_traps_last_amazon() {
        // B's only amazon has a single open neighbor; burning it wins
        let a = [to_index(3, 3)];
        let b = [to_index(1, 1)];
        let burnt = [to_index(1, 2), to_index(2, 1)];
        let pos = Position::from_layout(&a, &b, &burnt).unwrap();

        let mv = greedy_move(&pos, Side::A).unwrap();
        let next = pos.with_move(Side::A, mv);
        assert!(next.has_no_moves(Side::B), "greedy move {mv} should trap B");
    }

    #[test]
    fn test_greedy_move_none_when_stuck() {
        let a = [to_index(1, 1)];
        let b = [to_index(N, N)];
        let burnt = [to_index(1, 2), to_index(2, 1), to_index(2, 2)];
        let pos = Position::from_layout(&a, &b, &burnt).unwrap();
        assert_eq!(greedy_move(&pos, Side::A), None);
    }
}
