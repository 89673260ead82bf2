//! Text front end: board rendering, move parsing and a line protocol.
//!
//! Moves are written as three `row,col` pairs (amazon, destination, arrow),
//! 1-indexed with row 1 at the top, e.g. `1,4 4,4 2,2`. Spaces after commas
//! are accepted.
//!
//! ## Protocol
//!
//! One command per line; replies start with `=` on success or `?` on error
//! and end with a blank line, in the style of GTP.
//!
//! - `name`, `version`, `help`, `quit`
//! - `new` - Reset to the starting position
//! - `show` - Print the board
//! - `turn` - Side to move
//! - `play <move>` - Play a move for the side to move
//! - `legal <move>` - Whether a move is legal for the side to move
//! - `genmove` - Search, play and print a move
//! - `eval` - Static evaluation with its terms
//! - `count` / `moves` - Number / list of legal moves
//! - `rollouts <n>`, `depth <n>`, `seed <n>` - Search settings

use std::fmt::Write as _;
use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};

use crate::constants::N;
use crate::eval::evaluate_detailed;
use crate::game::{Agent, Game};
use crate::geometry::{Point, to_index};
use crate::mcts::{SearchConfig, select_move};
use crate::position::{Move, Position, Side, Tile};

/// Commands understood by [`Console`].
const KNOWN_COMMANDS: &[&str] = &[
    "count", "depth", "eval", "genmove", "help", "legal", "moves", "name", "new", "play", "quit",
    "rollouts", "seed", "show", "turn", "version",
];

/// Parse a `row,col` pair.
pub fn parse_point(s: &str) -> Result<Point> {
    let nums = numbers(s)?;
    match nums.as_slice() {
        &[row, col] => checked_point(row, col),
        _ => bail!("expected 'row,col', got '{s}'"),
    }
}

/// Parse a move written as three `row,col` pairs.
pub fn parse_move(s: &str) -> Result<Move> {
    let nums = numbers(s)?;
    match nums.as_slice() {
        &[r0, c0, r1, c1, r2, c2] => Ok(Move::new(
            checked_point(r0, c0)?,
            checked_point(r1, c1)?,
            checked_point(r2, c2)?,
        )),
        _ => bail!("expected three 'row,col' pairs, got '{s}'"),
    }
}

fn numbers(s: &str) -> Result<Vec<usize>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<usize>().with_context(|| format!("'{t}' is not a number")))
        .collect()
}

fn checked_point(row: usize, col: usize) -> Result<Point> {
    if !(1..=N).contains(&row) || !(1..=N).contains(&col) {
        bail!("{row},{col} is off the board (rows and columns run 1 to {N})");
    }
    Ok(to_index(row, col))
}

/// The board with row and column numbers and a key.
pub fn render(pos: &Position) -> String {
    let mut out = String::new();
    let rule = format!("  +{}", "-+".repeat(N));

    let _ = writeln!(
        out,
        "key: {} side A, {} side B, {} burnt",
        Tile::Amazon(Side::A).icon(),
        Tile::Amazon(Side::B).icon(),
        Tile::Burnt.icon()
    );
    let header: String = (1..=N).map(|c| format!("{:<2}", c % 10)).collect();
    let _ = writeln!(out, "   {}", header.trim_end());
    let _ = writeln!(out, "{rule}");
    for (r, row) in pos.grid().iter().enumerate() {
        let cells: String = row
            .iter()
            .map(|&t| match t {
                Tile::Open => " |".to_string(),
                other => format!("{}|", other.icon()),
            })
            .collect();
        let _ = writeln!(out, "{:>2}|{cells}", r + 1);
        let _ = writeln!(out, "{rule}");
    }
    out
}

/// Line-protocol engine state.
pub struct Console {
    game: Game,
    config: SearchConfig,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Console {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            game: Game::new(),
            config,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Serve commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (command, args) = match line.split_once(char::is_whitespace) {
                Some((c, rest)) => (c.to_lowercase(), rest.trim()),
                None => (line.to_lowercase(), ""),
            };

            let (success, message) = match self.execute(&command, args) {
                Ok(m) => (true, m),
                Err(e) => (false, format!("{e:#}")),
            };
            let prefix = if success { '=' } else { '?' };
            writeln!(output, "{prefix} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command and return the reply text.
    pub fn execute(&mut self, command: &str, args: &str) -> Result<String> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),
            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),
            "help" => Ok(KNOWN_COMMANDS.join("\n")),
            "quit" => Ok(String::new()),

            "new" => {
                self.game = Game::new();
                Ok(String::new())
            }

            "show" => Ok(format!("\n{}", render(self.game.position()))),

            "turn" => Ok(self.game.to_move().to_string()),

            "play" => {
                let mv = parse_move(args)?;
                self.game.play(mv)?;
                Ok(self.status())
            }

            "legal" => {
                let mv = parse_move(args)?;
                let legal = self.game.position().is_legal(self.game.to_move(), mv);
                Ok(legal.to_string())
            }

            "genmove" => {
                let side = self.game.to_move();
                let Some(mv) = select_move(self.game.position(), side, &self.config) else {
                    bail!("side {side} has no legal moves");
                };
                self.game.play(mv)?;
                let status = self.status();
                Ok(if status.is_empty() {
                    mv.to_string()
                } else {
                    format!("{mv}\n{status}")
                })
            }

            "eval" => {
                let e = evaluate_detailed(self.game.position());
                Ok(format!(
                    "{} (moves A={} B={}, territory A={} B={})",
                    e.score, e.mobility[0], e.mobility[1], e.territory[0], e.territory[1]
                ))
            }

            "count" => {
                let pos = self.game.position();
                Ok(pos.count_legal_moves(self.game.to_move()).to_string())
            }

            "moves" => {
                let moves = self.game.position().enumerate_moves(self.game.to_move());
                Ok(moves.iter().map(Move::to_string).collect::<Vec<_>>().join("\n"))
            }

            "rollouts" => {
                self.config.rollouts = parse_arg(args)?;
                Ok(String::new())
            }

            "depth" => {
                self.config.depth = parse_arg(args)?;
                Ok(String::new())
            }

            "seed" => {
                self.config.seed = Some(parse_arg(args)?);
                Ok(String::new())
            }

            _ => bail!("unknown command: {command}"),
        }
    }

    fn status(&self) -> String {
        match self.game.winner() {
            Some(winner) => format!("game over: {winner} wins"),
            None => String::new(),
        }
    }
}

fn parse_arg<T: std::str::FromStr>(args: &str) -> Result<T> {
    let arg = args.split_whitespace().next().context("missing argument")?;
    arg.parse::<T>().map_err(|_| anyhow::anyhow!("invalid argument '{arg}'"))
}

/// Reads moves typed by a person.
pub struct HumanAgent<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanAgent<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Agent for HumanAgent<R, W> {
    fn choose(&mut self, game: &Game) -> Result<Move> {
        loop {
            writeln!(self.output, "{}", render(game.position()))?;
            write!(self.output, "Side {} to move (e.g. '1,4 4,4 2,2'): ", game.to_move())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("input closed");
            }

            match parse_move(&line) {
                Ok(mv) => match game.position().check_move(game.to_move(), mv) {
                    Ok(()) => return Ok(mv),
                    Err(e) => writeln!(self.output, "That is not a legal move ({e}). Please try again.")?,
                },
                Err(e) => writeln!(self.output, "Invalid input: {e:#}. Please try again.")?,
            }
        }
    }

    fn name(&self) -> &str {
        "human"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{START_A, START_B};

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("2,3").unwrap(), to_index(2, 3));
        assert_eq!(parse_point(" 2, 3 ").unwrap(), to_index(2, 3));
        assert!(parse_point("0,3").is_err());
        assert!(parse_point(&format!("{},1", N + 1)).is_err());
        assert!(parse_point("a,b").is_err());
        assert!(parse_point("1,2,3").is_err());
    }

    #[test]
    fn test_parse_move_matches_display() {
        let pos = Position::new();
        for mv in pos.enumerate_moves(Side::A).into_iter().step_by(97) {
            assert_eq!(parse_move(&mv.to_string()).unwrap(), mv);
        }
        assert!(parse_move("1,1 2,2").is_err());
    }

    #[test]
    fn test_render_shows_pieces() {
        let text = render(&Position::new());
        let at = text.matches('@').count();
        let oh = text.matches('O').count();
        // one in the key line, the rest on the board
        assert_eq!(at, START_A.len() + 1);
        assert_eq!(oh, START_B.len() + 1);
        assert_eq!(text.lines().count(), 3 + 2 * N);
    }

    #[test]
    fn test_execute_basic() {
        let mut console = Console::new(SearchConfig::with_rollouts(20).seed(1));
        assert_eq!(console.execute("name", "").unwrap(), "amazons-rust");
        assert_eq!(console.execute("turn", "").unwrap(), "A");
        assert!(console.execute("bogus", "").is_err());
        assert!(console.execute("rollouts", "x").is_err());
        assert!(console.execute("play", "1,1").is_err());
    }

    #[test]
    fn test_play_and_legal() {
        let mut console = Console::default();
        let mv = console.game().position().enumerate_moves(Side::A)[0];
        let text = mv.to_string();
        assert_eq!(console.execute("legal", &text).unwrap(), "true");
        console.execute("play", &text).unwrap();
        assert_eq!(console.execute("turn", "").unwrap(), "B");
        assert_eq!(console.execute("legal", &text).unwrap(), "false");
        console.execute("new", "").unwrap();
        assert_eq!(console.game().history().len(), 0);
    }

    #[test]
    fn test_genmove_plays_legal_move() {
        let mut console = Console::new(SearchConfig::with_rollouts(30).depth(2).seed(4));
        let before = console.game().position().clone();
        let reply = console.execute("genmove", "").unwrap();
        let mv = parse_move(reply.lines().next().unwrap()).unwrap();
        assert!(before.is_legal(Side::A, mv));
        assert_eq!(console.game().history(), &[(Side::A, mv)]);
    }

    #[test]
    fn test_run_protocol() {
        let input = b"name\n# comment\n\nturn\nfoo\nquit\nname\n";
        let mut out = Vec::new();
        Console::default().run(&input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "= amazons-rust\n\n= A\n\n? unknown command: foo\n\n= \n\n");
    }

    #[test]
    fn test_human_agent_retries() {
        let game = Game::new();
        let mv = game.position().enumerate_moves(Side::A)[5];
        let input = format!("nonsense\n1,1 1,1 1,1\n{mv}\n");
        let mut out = Vec::new();
        let mut human = HumanAgent::new(input.as_bytes(), &mut out);
        assert_eq!(human.choose(&game).unwrap(), mv);
        drop(human);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid input"));
        assert!(text.contains("not a legal move"));
    }
}
