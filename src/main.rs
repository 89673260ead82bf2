//! Amazons-Rust: play the game of the Amazons against a tree-search engine.
//!
//! ## Usage
//!
//! - `amazons-rust` - Show a demo
//! - `amazons-rust play --a human --b mcts` - Play a game in the terminal
//! - `amazons-rust console` - Start the line protocol on stdin/stdout
//!
//! Set `RUST_LOG=debug` (or pass `--verbose`) to see search statistics.

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use amazons_rust::console::{Console, HumanAgent, render};
use amazons_rust::constants::{N, N_ROLLOUTS, SEARCH_DEPTH};
use amazons_rust::eval::evaluate_detailed;
use amazons_rust::game::{Agent, Game, GreedyAgent, MctsAgent, play_out};
use amazons_rust::mcts::{SearchConfig, select_move};
use amazons_rust::position::Side;

/// Amazons-Rust: an Amazons engine using Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "amazons-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search statistics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game in the terminal
    Play {
        /// Who plays side A (moves first)
        #[arg(long, value_enum, default_value_t = PlayerKind::Human)]
        a: PlayerKind,
        /// Who plays side B
        #[arg(long, value_enum, default_value_t = PlayerKind::Mcts)]
        b: PlayerKind,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Start the line protocol on stdin/stdout
    Console {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Run a short demo of the engine
    Demo,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    Human,
    Mcts,
    Greedy,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Rollouts per engine move
    #[arg(long, default_value_t = N_ROLLOUTS)]
    rollouts: usize,
    /// Plies per rollout
    #[arg(long, default_value_t = SEARCH_DEPTH)]
    depth: u32,
    /// Seed for reproducible searches
    #[arg(long)]
    seed: Option<u64>,
    /// Stop each search after this many milliseconds
    #[arg(long)]
    time_ms: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            rollouts: self.rollouts,
            depth: self.depth,
            seed: self.seed,
            time_limit: self.time_ms.map(Duration::from_millis),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Some(Commands::Play { a, b, search }) => run_game(a, b, &search.config()),
        Some(Commands::Console { search }) => {
            let stdin = io::stdin();
            Console::new(search.config()).run(stdin.lock(), io::stdout())
        }
        Some(Commands::Demo) | None => {
            run_demo();
            Ok(())
        }
    }
}

fn make_agent(kind: PlayerKind, config: &SearchConfig) -> Box<dyn Agent> {
    match kind {
        // unbuffered beyond one byte so two human players can share stdin
        PlayerKind::Human => Box::new(HumanAgent::new(
            io::BufReader::with_capacity(1, io::stdin()),
            io::stdout(),
        )),
        PlayerKind::Mcts => Box::new(MctsAgent::new(config.clone())),
        PlayerKind::Greedy => Box::new(GreedyAgent),
    }
}

fn run_game(a: PlayerKind, b: PlayerKind, config: &SearchConfig) -> Result<()> {
    let mut game = Game::new();
    let mut agent_a = make_agent(a, config);
    let mut agent_b = make_agent(b, config);

    let winner = play_out(&mut game, agent_a.as_mut(), agent_b.as_mut(), |_, side, mv| {
        println!("{side} plays {mv}");
    })?;

    println!("{}", render(game.position()));
    match winner {
        Side::A => println!("Player 1 (side A) won!"),
        Side::B => println!("Player 2 (side B) won!"),
    }
    Ok(())
}

fn run_demo() {
    println!("Amazons-Rust: Monte Carlo Tree Search for the Game of the Amazons\n");

    let mut game = Game::new();
    println!("=== Starting position ({N}x{N}) ===");
    println!("{}", render(game.position()));

    let pos = game.position();
    println!("Legal moves for A: {}", pos.count_legal_moves(Side::A));
    let e = evaluate_detailed(pos);
    println!("Evaluation: {} (territory A={} B={})\n", e.score, e.territory[0], e.territory[1]);

    println!("=== MCTS Demo ===");
    let config = SearchConfig::with_rollouts(300).seed(1);
    println!("Running {} rollouts...", config.rollouts);
    if let Some(mv) = select_move(game.position(), Side::A, &config) {
        println!("Best move for A: {mv}");
        if game.play(mv).is_ok() {
            println!("{}", render(game.position()));
            println!("Evaluation after move: {}", evaluate_detailed(game.position()).score);
        }
    }
}
