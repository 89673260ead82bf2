//! Monte Carlo Tree Search over Amazons positions.
//!
//! The tree grows lazily: a node knows how many legal moves it has (counted
//! without generating them) and opens one randomly chosen child at a time.
//! Each rollout descends from the root for a fixed number of plies, then
//! scores the reached position with the static evaluation. The raw score is
//! passed back up unchanged; each node reads it from the point of view of the
//! side that moved into it.
//!
//! Selection uses a "promise" score mixing the child's winrate with a bonus
//! that shrinks with its visit count. While a node still has unopened moves,
//! a child must beat [`UNEXPLORED_FLOOR`] to be chosen over opening a new one.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use fastrand::Rng;
use log::{debug, trace};

use crate::constants::{CANCEL_CHECK_PERIOD, N_ROLLOUTS, SEARCH_DEPTH, UNEXPLORED_FLOOR};
use crate::eval::{evaluate, favors, worst_eval};
use crate::position::{Move, Position, Side};

/// Search parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Number of rollouts per search.
    pub rollouts: usize,
    /// Plies per rollout before static evaluation.
    pub depth: u32,
    /// Seed for the search RNG. `None` draws a fresh seed.
    pub seed: Option<u64>,
    /// Stop early once this much time has passed.
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rollouts: N_ROLLOUTS,
            depth: SEARCH_DEPTH,
            seed: None,
            time_limit: None,
        }
    }
}

impl SearchConfig {
    /// Create a config with the given number of rollouts.
    pub fn with_rollouts(rollouts: usize) -> Self {
        Self {
            rollouts,
            ..Self::default()
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    fn rng(&self) -> Rng {
        match self.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        }
    }
}

/// Cooperative stop signal for a running search.
///
/// Clones share the same flag, so another thread can call [`cancel`] while
/// the search polls [`is_cancelled`] between rollouts.
///
/// [`cancel`]: CancelToken::cancel
/// [`is_cancelled`]: CancelToken::is_cancelled
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also fires once `limit` has elapsed from now.
    pub fn after(limit: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Some(Instant::now() + limit),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// A node in the search tree.
///
/// The position is fixed at construction; only the statistics and the set
/// of opened children change afterwards.
pub struct TreeNode {
    /// The position at this node
    pub pos: Position,
    /// Side to move here
    pub side: Side,
    /// Move the other side played to reach this node (`None` at the root)
    pub last_move: Option<Move>,
    /// Number of rollouts through this node
    pub visits: u32,
    /// Rollouts that ended in favor of the side that moved into this node
    pub wins: u32,
    /// Number of legal moves from this position
    pub num_moves: usize,
    /// Opened children, in opening order
    pub children: Vec<TreeNode>,
    /// Indices into `pos.enumerate_moves(side)` that already have a child
    expanded: HashSet<usize>,
}

impl TreeNode {
    /// Create a root node for `side` to move in `pos`.
    pub fn new(pos: &Position, side: Side) -> Self {
        Self::with_move(pos.clone(), side, None)
    }

    fn with_move(pos: Position, side: Side, last_move: Option<Move>) -> Self {
        let num_moves = pos.count_legal_moves(side);
        Self {
            pos,
            side,
            last_move,
            visits: 0,
            wins: 0,
            num_moves,
            children: Vec::new(),
            expanded: HashSet::new(),
        }
    }

    /// Whether the side to move has lost.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.num_moves == 0
    }

    /// Whether every legal move has a child.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.children.len() == self.num_moves
    }

    /// Calculate the winrate for this node.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            -0.1 // Indicate unvisited
        }
    }

    /// Open a child for a random move that has none yet, and return it.
    ///
    /// # Panics
    /// If every legal move already has a child.
    pub fn expand_random_unexplored(&mut self, rng: &mut Rng) -> &mut TreeNode {
        let remaining = self.num_moves - self.children.len();
        assert!(remaining > 0, "expand_random_unexplored: no unexplored moves left");
        let target = rng.usize(..remaining);

        let moves = self.pos.enumerate_moves(self.side);
        let Some((index, mv)) = moves
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !self.expanded.contains(i))
            .nth(target)
        else {
            panic!("expand_random_unexplored: move count out of sync with enumeration");
        };

        trace!("expand {} for {} ({} of {})", mv, self.side, index, self.num_moves);

        let child = TreeNode::with_move(self.pos.with_move(self.side, mv), self.side.opponent(), Some(mv));
        self.children.push(child);
        self.expanded.insert(index);

        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// How attractive it is to continue a rollout through this node.
    ///
    /// An unvisited node scores exactly 1.5.
    pub fn promise(&self) -> f64 {
        let exploration = 1.0 / ((self.visits as f64 + 1.0).ln() + 1.0);
        let exploitation = if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            0.5
        };
        exploration + exploitation
    }

    /// Index of the child with the highest promise strictly above `floor`,
    /// breaking ties at random. `None` if no child beats the floor.
    pub fn most_promising_index(&self, floor: f64, rng: &mut Rng) -> Option<usize> {
        let mut best = floor;
        let mut ties: Vec<usize> = Vec::new();

        for (i, child) in self.children.iter().enumerate() {
            let p = child.promise();
            if p > best {
                best = p;
                ties.clear();
                ties.push(i);
            } else if p == best && !ties.is_empty() {
                ties.push(i);
            }
        }

        if ties.is_empty() {
            None
        } else {
            Some(ties[rng.usize(..ties.len())])
        }
    }

    /// Record one rollout result. A win is counted when `eval` favors the
    /// side that moved into this node.
    #[inline]
    pub fn update_counters(&mut self, eval: i32) {
        self.visits += 1;
        if favors(self.side.opponent(), eval) {
            self.wins += 1;
        }
    }

    /// Simulate `depth` more plies below this node and return the score of
    /// where the simulation ended.
    pub fn rollout(&mut self, depth: u32, rng: &mut Rng) -> i32 {
        if depth == 0 {
            let eval = evaluate(&self.pos);
            self.update_counters(eval);
            return eval;
        }
        if self.is_terminal() {
            let eval = worst_eval(self.side);
            self.update_counters(eval);
            return eval;
        }

        let floor = if self.is_fully_expanded() { 0.0 } else { UNEXPLORED_FLOOR };
        let eval = match self.most_promising_index(floor, rng) {
            Some(i) => self.children[i].rollout(depth - 1, rng),
            None => self.expand_random_unexplored(rng).rollout(depth - 1, rng),
        };

        self.update_counters(eval);
        eval
    }

    /// Index of the child with the most wins (first one on ties).
    pub fn best_child_index(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (i, child) in self.children.iter().enumerate() {
            if best.is_none_or(|(_, wins)| child.wins > wins) {
                best = Some((i, child.wins));
            }
        }
        best.map(|(i, _)| i)
    }

    /// The move leading to [`best_child_index`](Self::best_child_index).
    pub fn best_move(&self) -> Option<Move> {
        self.best_child_index().and_then(|i| self.children[i].last_move)
    }

    /// Run exactly `rollouts` rollouts of `depth` plies from this node.
    pub fn search(&mut self, rollouts: usize, depth: u32, rng: &mut Rng) {
        for _ in 0..rollouts {
            self.rollout(depth, rng);
        }
    }

    /// Like [`search`](Self::search), but stops early when `cancel` fires.
    /// Returns the number of rollouts run.
    pub fn search_until(&mut self, rollouts: usize, depth: u32, rng: &mut Rng, cancel: &CancelToken) -> usize {
        for i in 0..rollouts {
            if i % CANCEL_CHECK_PERIOD == 0 && cancel.is_cancelled() {
                return i;
            }
            self.rollout(depth, rng);
        }
        rollouts
    }
}

/// Search from `pos` with `side` to move and return the chosen move, or
/// `None` if `side` has no legal moves.
///
/// A fresh tree is built for every call. The returned move is legal for
/// `side` in `pos`; applying it is up to the caller.
pub fn select_move(pos: &Position, side: Side, config: &SearchConfig) -> Option<Move> {
    let cancel = match config.time_limit {
        Some(limit) => CancelToken::after(limit),
        None => CancelToken::new(),
    };
    select_move_with(pos, side, config, &cancel)
}

/// [`select_move`] with an externally controlled cancellation token.
pub fn select_move_with(pos: &Position, side: Side, config: &SearchConfig, cancel: &CancelToken) -> Option<Move> {
    let mut root = TreeNode::new(pos, side);
    if root.is_terminal() {
        return None;
    }

    let mut rng = config.rng();
    let started = Instant::now();
    // at least one rollout of one ply so the root has a child
    root.rollout(config.depth.max(1), &mut rng);
    let done = 1 + root.search_until(config.rollouts.saturating_sub(1), config.depth.max(1), &mut rng, cancel);

    debug!(
        "search for {}: {} rollouts in {:.2?}, {} of {} moves opened",
        side,
        done,
        started.elapsed(),
        root.children.len(),
        root.num_moves
    );
    dump_children(&root);

    root.best_move()
}

/// Log statistics for the root's most visited children.
pub fn dump_children(root: &TreeNode) {
    let mut order: Vec<&TreeNode> = root.children.iter().collect();
    order.sort_by(|a, b| b.visits.cmp(&a.visits));
    for child in order.iter().take(8) {
        if let Some(mv) = child.last_move {
            debug!("move {} v={} w={} wr={:.3}", mv, child.visits, child.wins, child.winrate());
        }
    }
}
