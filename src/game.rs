//! Game state and the turn loop.
//!
//! [`Game`] owns the authoritative position and whose turn it is. Agents
//! propose moves; the game validates and applies them, and ends when the side
//! to move has nothing left.

use anyhow::{Result, bail};
use log::info;

use crate::eval::greedy_move;
use crate::mcts::{SearchConfig, select_move};
use crate::position::{Move, MoveError, Position, Side};

/// A game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    pos: Position,
    to_move: Side,
    history: Vec<(Side, Move)>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A new game from the starting layout, side A to move.
    pub fn new() -> Self {
        Self::from_position(Position::new(), Side::A)
    }

    pub fn from_position(pos: Position, to_move: Side) -> Self {
        Self {
            pos,
            to_move,
            history: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Moves played so far, oldest first.
    pub fn history(&self) -> &[(Side, Move)] {
        &self.history
    }

    /// Play `mv` for the side to move and pass the turn.
    ///
    /// # Errors
    /// The position is unchanged if the move is illegal.
    pub fn play(&mut self, mv: Move) -> Result<(), MoveError> {
        self.pos.make_move(self.to_move, mv)?;
        self.history.push((self.to_move, mv));
        self.to_move = self.to_move.opponent();
        Ok(())
    }

    /// Whether the side to move has lost.
    pub fn is_over(&self) -> bool {
        self.pos.has_no_moves(self.to_move)
    }

    /// The winner, once the game is over.
    pub fn winner(&self) -> Option<Side> {
        self.is_over().then(|| self.to_move.opponent())
    }
}

/// Something that chooses moves for one side.
pub trait Agent {
    /// Pick a move for `game.to_move()`. Only called while the game is not
    /// over.
    fn choose(&mut self, game: &Game) -> Result<Move>;

    fn name(&self) -> &str;
}

/// Chooses moves with tree search.
pub struct MctsAgent {
    pub config: SearchConfig,
}

impl MctsAgent {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

impl Agent for MctsAgent {
    fn choose(&mut self, game: &Game) -> Result<Move> {
        match select_move(game.position(), game.to_move(), &self.config) {
            Some(mv) => Ok(mv),
            None => bail!("search found no move for side {}", game.to_move()),
        }
    }

    fn name(&self) -> &str {
        "mcts"
    }
}

/// Chooses the move with the best static evaluation one ply ahead.
#[derive(Default)]
pub struct GreedyAgent;

impl Agent for GreedyAgent {
    fn choose(&mut self, game: &Game) -> Result<Move> {
        match greedy_move(game.position(), game.to_move()) {
            Some(mv) => Ok(mv),
            None => bail!("no legal move for side {}", game.to_move()),
        }
    }

    fn name(&self) -> &str {
        "greedy"
    }
}

/// Alternate `agent_a` and `agent_b` until one side cannot move, calling
/// `on_move` after every move. Returns the winner.
///
/// Agents that return an illegal move are asked again; an agent error ends
/// the game with that error.
pub fn play_out(
    game: &mut Game,
    agent_a: &mut dyn Agent,
    agent_b: &mut dyn Agent,
    mut on_move: impl FnMut(&Game, Side, Move),
) -> Result<Side> {
    while !game.is_over() {
        let side = game.to_move();
        let agent: &mut dyn Agent = match side {
            Side::A => &mut *agent_a,
            Side::B => &mut *agent_b,
        };

        let mv = agent.choose(game)?;
        match game.play(mv) {
            Ok(()) => {
                info!("{} ({}) plays {}", side, agent.name(), mv);
                on_move(game, side, mv);
            }
            Err(e) => info!("{} ({}) tried {}: {}", side, agent.name(), mv, e),
        }
    }

    let loser = game.to_move();
    info!("game over after {} moves: {} cannot move", game.history().len(), loser);
    Ok(loser.opponent())
}
