//! Board geometry and occupancy
//!
//! Cells are addressed by a flat index `i` with `row = i / cols` and
//! `col = i % cols`. Only occupied cells carry a tile; a slot bitmap mirrors
//! the tile map so occupancy checks never touch the hash map.

use std::cmp::Reverse;

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::tile::Tile;

// ============================================================================
// DIRECTIONS
// ============================================================================

/// Swipe direction, also used as an axis direction when scanning for runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Traversal that starts at this direction's leading edge
    pub fn traversal_order(self) -> TraversalOrder {
        match self {
            Direction::Up => TraversalOrder::ColumnMajor,
            Direction::Down => TraversalOrder::ColumnMajorReverse,
            Direction::Left => TraversalOrder::RowMajor,
            Direction::Right => TraversalOrder::RowMajorReverse,
        }
    }

    /// (drow, dcol) unit vector pointing toward the edge this direction swipes to
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Order in which occupied indices are visited
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalOrder {
    /// Rows top to bottom, columns left to right within a row
    RowMajor,
    /// Exact reverse of `RowMajor`
    RowMajorReverse,
    /// Columns left to right, rows top to bottom within a column
    ColumnMajor,
    /// Exact reverse of `ColumnMajor`
    ColumnMajorReverse,
}

// ============================================================================
// BOARD
// ============================================================================

/// Fixed-size grid holding at most one tile per cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// One bit per cell, set iff `tiles` has an entry for that index
    slots: Vec<u64>,
    /// Sparse index -> tile storage
    tiles: FxHashMap<usize, Tile>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidConfig(format!(
                "board dimensions must be non-zero, got {rows}x{cols}"
            )));
        }
        let capacity = rows.checked_mul(cols).ok_or_else(|| {
            GameError::InvalidConfig(format!("board dimensions overflow: {rows}x{cols}"))
        })?;
        Ok(Self {
            rows,
            cols,
            slots: vec![0; capacity.div_ceil(64)],
            tiles: FxHashMap::default(),
        })
    }

    /// Build a board from row-major values, `0` meaning an empty cell
    pub fn from_grid(grid: &[&[u32]]) -> Result<Self> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, |row| row.len());
        if grid.iter().any(|row| row.len() != cols) {
            return Err(GameError::InvalidConfig("grid rows differ in length".to_string()));
        }
        let mut board = Self::new(rows, cols)?;
        for (r, row) in grid.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value != 0 {
                    board.set(r * cols + c, Tile::new(value)?)?;
                }
            }
        }
        Ok(board)
    }

    // ========================================================================
    // GEOMETRY
    // ========================================================================

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// (row, col) of an index
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Neighbouring index one step toward `direction`'s edge, if on the board
    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        let (row, col) = self.coords(index);
        let (dr, dc) = direction.delta();
        let row = row.checked_add_signed(dr).filter(|&r| r < self.rows)?;
        let col = col.checked_add_signed(dc).filter(|&c| c < self.cols)?;
        Some(row * self.cols + col)
    }

    // ========================================================================
    // OCCUPANCY
    // ========================================================================

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    pub fn has(&self, index: usize) -> bool {
        index < self.capacity() && self.slots[index / 64] & (1 << (index % 64)) != 0
    }

    pub fn get(&self, index: usize) -> Option<Tile> {
        self.tiles.get(&index).copied()
    }

    /// Store `tile` at `index`, returning the tile it replaced
    pub fn set(&mut self, index: usize, tile: Tile) -> Result<Option<Tile>> {
        if index >= self.capacity() {
            return Err(GameError::OutOfRange {
                index,
                capacity: self.capacity(),
            });
        }
        self.slots[index / 64] |= 1 << (index % 64);
        Ok(self.tiles.insert(index, tile))
    }

    /// Remove the tile at `index`; false if the cell was empty
    pub fn delete(&mut self, index: usize) -> bool {
        if self.tiles.remove(&index).is_none() {
            return false;
        }
        self.slots[index / 64] &= !(1 << (index % 64));
        true
    }

    /// Move the tile at `from` to the empty cell `to`
    pub fn relocate(&mut self, from: usize, to: usize) -> Result<()> {
        let tile = self.get(from).ok_or(GameError::MissingTile { index: from })?;
        if to >= self.capacity() {
            return Err(GameError::OutOfRange {
                index: to,
                capacity: self.capacity(),
            });
        }
        if self.has(to) {
            return Err(GameError::Occupied { index: to });
        }
        self.delete(from);
        self.set(to, tile)?;
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Occupied indices in the requested order
    pub fn traverse(&self, order: TraversalOrder) -> Vec<usize> {
        let mut indices: Vec<usize> = self.tiles.keys().copied().collect();
        let cols = self.cols;
        match order {
            TraversalOrder::RowMajor => indices.sort_unstable(),
            TraversalOrder::RowMajorReverse => indices.sort_unstable_by_key(|&i| Reverse(i)),
            TraversalOrder::ColumnMajor => indices.sort_unstable_by_key(|&i| (i % cols, i / cols)),
            TraversalOrder::ColumnMajorReverse => {
                indices.sort_unstable_by_key(|&i| Reverse((i % cols, i / cols)))
            }
        }
        indices
    }

    /// Occupied cells in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (usize, Tile)> + '_ {
        self.traverse(TraversalOrder::RowMajor)
            .into_iter()
            .filter_map(move |i| self.get(i).map(|tile| (i, tile)))
    }

    /// Uniformly random empty cell
    pub fn random_unoccupied_index<R: Rng>(&self, rng: &mut R) -> Result<usize> {
        let free = self.capacity() - self.len();
        if free == 0 {
            return Err(GameError::BoardFull);
        }
        let pick = rng.gen_range(0..free);
        (0..self.capacity())
            .filter(|&i| !self.has(i))
            .nth(pick)
            .ok_or(GameError::BoardFull)
    }

    /// Mean (row, col) over occupied cells; the board centre when empty
    pub fn occupied_centroid(&self) -> (f64, f64) {
        if self.is_empty() {
            return (
                (self.rows as f64 - 1.0) / 2.0,
                (self.cols as f64 - 1.0) / 2.0,
            );
        }
        let (row_sum, col_sum) = self.tiles.keys().fold((0usize, 0usize), |(rs, cs), &i| {
            let (r, c) = self.coords(i);
            (rs + r, cs + c)
        });
        let n = self.len() as f64;
        (row_sum as f64 / n, col_sum as f64 / n)
    }

    pub fn max_tile(&self) -> Option<Tile> {
        self.tiles.values().copied().max()
    }
}
