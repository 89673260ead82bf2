//! Amazons-Rust: a Monte Carlo Tree Search engine for the Game of the Amazons.
//!
//! Each turn a player moves one amazon like a chess queen, then shoots an
//! arrow, also like a queen, from its new square. The arrow burns the square
//! it lands on for the rest of the game. A player who cannot move loses.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, starting layouts and engine parameters
//! - [`geometry`] - Conversions between (row, col) and board indices
//! - [`bitset`] - Bit vector over the padded board
//! - [`position`] - Board state, move legality, move generation and counting
//! - [`eval`] - Static evaluation (mobility and territory)
//! - [`mcts`] - Monte Carlo Tree Search with lazy expansion
//! - [`game`] - Game state, agents and the turn loop
//! - [`console`] - Text rendering, move parsing and a line protocol
//!
//! ## Example
//!
//! ```
//! use amazons_rust::position::{Position, Side};
//! use amazons_rust::mcts::{SearchConfig, select_move};
//!
//! // Create a new game
//! let mut pos = Position::new();
//!
//! // Run MCTS to find a move for the first player
//! let config = SearchConfig::with_rollouts(50).depth(2).seed(7);
//! let mv = select_move(&pos, Side::A, &config).unwrap();
//!
//! // The chosen move is always legal
//! pos.make_move(Side::A, mv).unwrap();
//! println!("A plays {mv}");
//! ```

pub mod bitset;
pub mod console;
pub mod constants;
pub mod eval;
pub mod game;
pub mod geometry;
pub mod mcts;
pub mod position;
