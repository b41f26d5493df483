//! Movement resolution (slides without merging)
//!
//! Tiles are visited starting from the swipe's leading edge, so every tile
//! slides against cells that are already settled. A tile therefore moves at
//! most once and never passes another tile.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Direction};
use crate::error::Result;

/// Relocation of one tile, value unchanged
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

/// Compute the slides for `direction` without touching `board`
///
/// Works on a private copy; the returned moves are in the order they must be
/// applied.
pub fn resolve_moves(board: &Board, direction: Direction) -> Result<Vec<Move>> {
    let mut working = board.clone();
    let mut moves = Vec::new();

    for index in board.traverse(direction.traversal_order()) {
        let to = slide_target(&working, index, direction);
        if to != index {
            working.relocate(index, to)?;
            moves.push(Move { from: index, to });
        }
    }

    Ok(moves)
}

/// Commit moves produced by [`resolve_moves`] against the same board
pub fn apply_moves(board: &mut Board, moves: &[Move]) -> Result<()> {
    for mv in moves {
        board.relocate(mv.from, mv.to)?;
    }
    Ok(())
}

/// Furthest empty cell reachable from `index` toward the edge
fn slide_target(board: &Board, index: usize, direction: Direction) -> usize {
    let mut track = index;
    while let Some(next) = board.neighbor(track, direction) {
        if board.has(next) {
            break;
        }
        track = next;
    }
    track
}
