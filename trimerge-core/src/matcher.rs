//! Match detection
//!
//! ## Architecture
//! - Level 1: `compute_matches()` - primary scan, secondary scan, overlap resolution
//! - Level 2: `directional_matches()`, `secondary_direction()`
//! - Level 3: contiguity checks (stride + axis boundary)

use serde::{Deserialize, Serialize};

use crate::board::{Board, Direction};
use crate::cluster::{resolve_special_matches, MatchCluster};
use crate::tile::Tile;

/// Minimum run length that merges
pub const DEFAULT_MATCH_THRESHOLD: usize = 3;

// ============================================================================
// TYPES
// ============================================================================

/// A maximal run of equal tiles along one axis, in traversal order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalMatch {
    pub direction: Direction,
    pub indices: Vec<usize>,
}

impl DirectionalMatch {
    /// The tile that absorbs the rest of the run; `None` for an empty run
    pub fn root(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    /// Tiles deleted when the run merges; empty for a run of zero or one tile
    pub fn non_root(&self) -> &[usize] {
        self.indices.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Qualifying runs for one board snapshot, split by overlap
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Runs sharing no tile with any other qualifying run
    pub simple: Vec<DirectionalMatch>,
    /// Groups of overlapping runs
    pub clusters: Vec<MatchCluster>,
}

impl MatchReport {
    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.clusters.is_empty()
    }

    /// Runs to merge this pass, in commit order: simple runs, then each
    /// cluster's branches followed by its collapsible runs
    pub fn mergeable(&self) -> impl Iterator<Item = &DirectionalMatch> + '_ {
        self.simple.iter().chain(
            self.clusters
                .iter()
                .flat_map(|cluster| cluster.branches.iter().chain(cluster.collapsible.iter())),
        )
    }

    /// Runs deferred to a later pass
    pub fn blocked(&self) -> impl Iterator<Item = &DirectionalMatch> + '_ {
        self.clusters.iter().flat_map(|cluster| cluster.blocked.iter())
    }
}

// ============================================================================
// LEVEL 1 - PIPELINE
// ============================================================================

/// Scan the swipe axis and the centroid-chosen cross axis, keep runs of at
/// least `threshold` tiles, and reconcile runs that share tiles
pub fn compute_matches(board: &Board, direction: Direction, threshold: usize) -> MatchReport {
    let secondary = secondary_direction(board, direction);
    let mut runs = qualifying_matches(board, direction, threshold);
    runs.extend(qualifying_matches(board, secondary, threshold));

    let report = resolve_special_matches(runs);
    tracing::trace!(
        ?direction,
        ?secondary,
        simple = report.simple.len(),
        clusters = report.clusters.len(),
        "matches computed"
    );
    report
}

// ============================================================================
// LEVEL 2 - AXIS SCANS
// ============================================================================

/// All maximal equal-value runs along `direction`'s axis, any length
///
/// Runs are listed in traversal order and each run's indices start at the
/// edge `direction` points to.
pub fn directional_matches<F>(board: &Board, direction: Direction, equal: F) -> Vec<DirectionalMatch>
where
    F: Fn(Tile, Tile) -> bool,
{
    let mut matches: Vec<DirectionalMatch> = Vec::new();

    for index in board.traverse(direction.traversal_order()) {
        let Some(tile) = board.get(index) else {
            continue;
        };

        let extends = matches
            .last()
            .and_then(|run| run.indices.last().copied())
            .is_some_and(|last| {
                is_contiguous(board, direction, last, index)
                    && board.get(last).is_some_and(|prev| equal(tile, prev))
            });

        match matches.last_mut() {
            Some(run) if extends => run.indices.push(index),
            _ => matches.push(DirectionalMatch {
                direction,
                indices: vec![index],
            }),
        }
    }

    matches
}

fn qualifying_matches(board: &Board, direction: Direction, threshold: usize) -> Vec<DirectionalMatch> {
    let mut runs = directional_matches(board, direction, |a, b| a == b);
    runs.retain(|m| m.len() >= threshold);
    runs
}

/// Cross axis to scan after a swipe, biased toward the denser half of the board
pub fn secondary_direction(board: &Board, direction: Direction) -> Direction {
    let (row_centroid, col_centroid) = board.occupied_centroid();
    if direction.is_vertical() {
        if col_centroid > (board.cols() as f64 - 1.0) / 2.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if row_centroid > (board.rows() as f64 - 1.0) / 2.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

// ============================================================================
// LEVEL 3 - CONTIGUITY
// ============================================================================

/// Signed index step between consecutive cells of a run
fn axis_stride(direction: Direction, cols: usize) -> isize {
    let cols = cols as isize;
    match direction {
        Direction::Up => cols,
        Direction::Down => -cols,
        Direction::Left => 1,
        Direction::Right => -1,
    }
}

/// Whether `current` directly follows `last` on the axis without leaving
/// its row (horizontal) or column (vertical)
fn is_contiguous(board: &Board, direction: Direction, last: usize, current: usize) -> bool {
    if last.checked_add_signed(axis_stride(direction, board.cols())) != Some(current) {
        return false;
    }
    let (last_row, last_col) = board.coords(last);
    let (row, col) = board.coords(current);
    if direction.is_vertical() {
        last_col == col
    } else {
        last_row == row
    }
}
