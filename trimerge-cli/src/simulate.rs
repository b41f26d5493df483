//! Simulate command - batch games with random swipes
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use trimerge_core::{Direction, GameConfig, GameSession, SpawnOutcome};

use crate::play::load_config;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Stop a game after this many swipes
    #[arg(long, default_value = "10000")]
    pub max_turns: usize,

    /// Game configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    /// Swipes attempted, including ones that changed nothing
    turns: usize,
    moves: u64,
    score: u64,
    max_tile: u32,
}

/// Aggregated results
#[derive(Clone, Debug, Serialize)]
struct SimulationResults {
    games: Vec<GameRecord>,
    best_score: u64,
    avg_score: f64,
    best_tile: u32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(args.config.as_deref(), None)?;

    tracing::info!(
        "Starting simulation: {} games on {}x{} (max {} turns)",
        args.games,
        config.rows,
        config.cols,
        args.max_turns
    );

    let results = play_games(&config, &args, seed)?;
    report_results(&results, args.json);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_games(config: &GameConfig, args: &SimulateArgs, seed: Option<u64>) -> Result<SimulationResults> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(args.games);

    for game_number in 1..=args.games {
        let game_config = config.clone().with_seed(rng.gen());
        let record = play_single_game(game_config, game_number, args.max_turns, &mut rng)?;

        tracing::info!(
            "Game {}: score {} after {} moves (max tile {})",
            record.game_number,
            record.score,
            record.moves,
            record.max_tile
        );
        games.push(record);
    }

    Ok(compute_statistics(games))
}

fn report_results(results: &SimulationResults, json: bool) {
    if json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Swipe randomly until no direction changes the board
fn play_single_game(
    config: GameConfig,
    game_number: usize,
    max_turns: usize,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut game = GameSession::new(config)?;
    let mut turns = 0;

    while turns < max_turns && game.has_legal_turn()? {
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let outcome = game.play_turn(direction)?;
        turns += 1;
        if outcome.spawn == SpawnOutcome::BoardFull {
            break;
        }
    }

    Ok(GameRecord {
        game_number,
        turns,
        moves: game.total_moves(),
        score: game.total_score(),
        max_tile: game.max_tile().map_or(0, |tile| tile.value()),
    })
}

fn compute_statistics(games: Vec<GameRecord>) -> SimulationResults {
    let best_score = games.iter().map(|g| g.score).max().unwrap_or(0);
    let best_tile = games.iter().map(|g| g.max_tile).max().unwrap_or(0);
    let avg_score = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.score as f64).sum::<f64>() / games.len() as f64
    };

    SimulationResults {
        games,
        best_score,
        avg_score,
        best_tile,
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn print_json_results(results: &SimulationResults) {
    if let Ok(json) = serde_json::to_string_pretty(results) {
        println!("{}", json);
    }
}

fn print_text_results(results: &SimulationResults) {
    println!("\n=== Simulation Results ===");
    println!("Total games: {}", results.games.len());
    println!("Best score:  {}", results.best_score);
    println!("Avg score:   {:.1}", results.avg_score);
    println!("Best tile:   {}", results.best_tile);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: score {} in {} moves, max tile {}",
            game.game_number, game.score, game.moves, game.max_tile
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_statistics_empty() {
        let results = compute_statistics(vec![]);
        assert_eq!(results.best_score, 0);
        assert_eq!(results.best_tile, 0);
        assert_eq!(results.avg_score, 0.0);
    }

    #[test]
    fn test_compute_statistics() {
        let record = |game_number, score, max_tile| GameRecord {
            game_number,
            turns: 10,
            moves: 8,
            score,
            max_tile,
        };
        let results = compute_statistics(vec![record(1, 30, 8), record(2, 90, 16)]);
        assert_eq!(results.best_score, 90);
        assert_eq!(results.best_tile, 16);
        assert_eq!(results.avg_score, 60.0);
    }

    #[test]
    fn test_single_game_terminates() {
        let mut rng = create_rng(Some(3));
        let config = GameConfig::default().with_seed(3);
        let record = play_single_game(config, 1, 5000, &mut rng).unwrap();
        assert!(record.turns > 0);
        assert!(record.moves <= record.turns as u64);
        assert!(record.max_tile >= 2);
    }

    #[test]
    fn test_seeded_simulation_is_deterministic() {
        let args = SimulateArgs {
            games: 3,
            max_turns: 200,
            config: None,
            json: false,
        };
        let config = GameConfig::default();
        let a = play_games(&config, &args, Some(21)).unwrap();
        let b = play_games(&config, &args, Some(21)).unwrap();
        let scores = |r: &SimulationResults| r.games.iter().map(|g| (g.score, g.moves)).collect::<Vec<_>>();
        assert_eq!(scores(&a), scores(&b));
    }
}
