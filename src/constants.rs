//! Constants for board dimensions, search parameters, and evaluation weights.
//!
//! The board is stored as a 1D array of cells with a one-cell border on every
//! side. Border cells are permanently occupied, so a sliding scan always stops
//! before leaving the board and never needs a bounds check.
//!
//! # Board Size Configuration
//!
//! The board width is controlled by Cargo features:
//! - `board10x10` (default): the standard 10x10 game
//! - `board8x8`: 8x8 with three amazons per side
//! - `board6x6`: 6x6 with two amazons per side
//!
//! ```sh
//! cargo build                                              # 10x10 (default)
//! cargo build --no-default-features --features board8x8   # 8x8
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board width (NxN playable cells).
#[cfg(feature = "board10x10")]
pub const N: usize = 10;

#[cfg(feature = "board8x8")]
pub const N: usize = 8;

#[cfg(feature = "board6x6")]
pub const N: usize = 6;

#[cfg(any(
    all(feature = "board10x10", feature = "board8x8"),
    all(feature = "board10x10", feature = "board6x6"),
    all(feature = "board8x8", feature = "board6x6"),
))]
compile_error!("Enable only one of 'board6x6', 'board8x8' or 'board10x10'");

#[cfg(not(any(feature = "board6x6", feature = "board8x8", feature = "board10x10")))]
compile_error!("Must enable exactly one board size feature: 'board6x6', 'board8x8' or 'board10x10'");

/// Padded board width (N + 2, one border cell on each side).
pub const W: usize = N + 2;

/// Total number of cells in the padded grid.
pub const BOARDSIZE: usize = W * W;

/// First playable index (row 1, column 1).
pub const BOARD_IMIN: usize = W + 1;

/// One past the last playable index (row N, column N).
pub const BOARD_IMAX: usize = W * (W - 1) - 1;

/// Number of border cells in the padded grid.
pub const BORDER_CELLS: usize = BOARDSIZE - N * N;

/// Offsets to the 8 queen directions in the 1D array.
/// Order: NW, N, NE, W, E, SW, S, SE
pub const DELTA: [isize; 8] = [
    -(W as isize) - 1, // NW
    -(W as isize),     // N
    -(W as isize) + 1, // NE
    -1,                // W
    1,                 // E
    W as isize - 1,    // SW
    W as isize,        // S
    W as isize + 1,    // SE
];

// =============================================================================
// Starting Layouts (row, col), 1-indexed
// =============================================================================

#[cfg(feature = "board10x10")]
pub const START_A: &[(usize, usize)] = &[(1, 4), (1, 7), (4, 1), (4, 10)];
#[cfg(feature = "board10x10")]
pub const START_B: &[(usize, usize)] = &[(7, 1), (7, 10), (10, 4), (10, 7)];

#[cfg(feature = "board8x8")]
pub const START_A: &[(usize, usize)] = &[(1, 5), (2, 1), (3, 8)];
#[cfg(feature = "board8x8")]
pub const START_B: &[(usize, usize)] = &[(6, 1), (7, 8), (8, 4)];

#[cfg(feature = "board6x6")]
pub const START_A: &[(usize, usize)] = &[(1, 2), (2, 6)];
#[cfg(feature = "board6x6")]
pub const START_B: &[(usize, usize)] = &[(5, 1), (6, 5)];

// =============================================================================
// Evaluation
// =============================================================================

/// Weight of the territory difference relative to the mobility difference.
pub const ALPHA: i32 = 50;

/// Magnitude of a lost position. Larger than any value `evaluate` can return.
pub const BIGNUM: i32 = 999_999;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default number of rollouts per move.
pub const N_ROLLOUTS: usize = 10_000;

/// Default depth of a rollout before the position is evaluated statically.
pub const SEARCH_DEPTH: u32 = 20;

/// Selection floor while a node still has unexpanded moves. An unvisited
/// child scores exactly this, so a new move is opened unless some child
/// strictly beats it.
pub const UNEXPLORED_FLOOR: f64 = 1.5;

/// Rollouts between two polls of a cancellation token.
pub const CANCEL_CHECK_PERIOD: usize = 64;
