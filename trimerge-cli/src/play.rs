//! Play command - interactive game on the terminal
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), game_loop()
//! - Level 3: parse_command()

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use trimerge_core::{Direction, GameConfig, GameSession, SpawnOutcome};

use crate::render::{describe_event, render_board};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Game configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every committed move and merge
    #[arg(long)]
    pub events: bool,
}

/// A line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Swipe(Direction),
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(args.config.as_deref(), seed)?;
    let mut game = GameSession::new(config).context("Failed to start game")?;

    tracing::info!(
        "Starting game: {}x{} board",
        game.board().rows(),
        game.board().cols()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    game_loop(&mut game, stdin.lock(), stdout.lock(), args.events)?;

    tracing::info!(
        "Game finished: score={}, moves={}",
        game.total_score(),
        game.total_moves()
    );
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config file (if any) with the command-line seed applied on top
pub(crate) fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    Ok(match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    })
}

fn game_loop<R: BufRead, W: Write>(
    game: &mut GameSession,
    input: R,
    mut out: W,
    show_events: bool,
) -> Result<()> {
    write!(out, "{}", render_board(game.board()))?;
    writeln!(out, "Score: 0  (w/a/s/d to swipe, q to quit)")?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let direction = match parse_command(&line) {
            Some(Command::Swipe(direction)) => direction,
            Some(Command::Quit) => break,
            None => {
                writeln!(out, "Unknown command: {}", line.trim())?;
                continue;
            }
        };

        let outcome = game.play_turn(direction)?;
        if show_events {
            for event in &outcome.events {
                writeln!(out, "  {}", describe_event(event))?;
            }
        }

        write!(out, "{}", render_board(game.board()))?;
        writeln!(
            out,
            "Score: {}  Moves: {}",
            game.total_score(),
            game.total_moves()
        )?;

        if outcome.spawn == SpawnOutcome::BoardFull || !game.has_legal_turn()? {
            writeln!(out, "No moves left. Final score: {}", game.total_score())?;
            break;
        }
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - INPUT
// ============================================================================

fn parse_command(line: &str) -> Option<Command> {
    let command = match line.trim().to_ascii_lowercase().as_str() {
        "w" | "up" => Command::Swipe(Direction::Up),
        "s" | "down" => Command::Swipe(Direction::Down),
        "a" | "left" => Command::Swipe(Direction::Left),
        "d" | "right" => Command::Swipe(Direction::Right),
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}
