//! Trimerge Core - Turn resolution for a sliding three-match tile puzzle
//!
//! This crate provides the game-state logic:
//! - Sparse board with explicit traversal orders
//! - Slide resolution toward the swiped edge
//! - Run detection on the swipe axis and a centroid-chosen cross axis
//! - Union-find clustering of overlapping runs
//! - Turn state machine: move/merge until settled, then spawn

pub mod board;
pub mod cluster;
pub mod config;
pub mod error;
pub mod game;
pub mod matcher;
pub mod movement;
pub mod tile;

// Re-exports for convenient access
pub use board::{Board, Direction, TraversalOrder};
pub use cluster::{resolve_special_matches, MatchCluster, UnionFind};
pub use config::{GameConfig, InitialTile, ScoringPolicy};
pub use error::{GameError, Result};
pub use game::{next_tile_value, GameSession, SpawnOutcome, TurnEvent, TurnOutcome, TurnPhase};
pub use matcher::{
    compute_matches, directional_matches, secondary_direction, DirectionalMatch, MatchReport,
    DEFAULT_MATCH_THRESHOLD,
};
pub use movement::{apply_moves, resolve_moves, Move};
pub use tile::{Tile, MIN_TILE};
