//! Tile values

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Lowest tile value; also the value every fresh game starts with
pub const MIN_TILE: u32 = 2;

/// A tile on the board. Always a power of two, at least [`MIN_TILE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Tile(u32);

impl Tile {
    /// Smallest tile
    pub const TWO: Tile = Tile(MIN_TILE);
    /// Second step of the sequence
    pub const FOUR: Tile = Tile(MIN_TILE * 2);

    pub fn new(value: u32) -> Result<Self> {
        if value < MIN_TILE || !value.is_power_of_two() {
            return Err(GameError::InvalidTileValue(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Next value in the sequence (saturates at the largest representable power of two)
    pub fn upgraded(self) -> Self {
        Self(self.0.checked_mul(2).unwrap_or(self.0))
    }

    /// Position in the sequence: 2 -> 1, 4 -> 2, 8 -> 3, ...
    pub fn rank(self) -> u32 {
        self.0.trailing_zeros()
    }
}

impl TryFrom<u32> for Tile {
    type Error = GameError;

    fn try_from(value: u32) -> Result<Self> {
        Tile::new(value)
    }
}

impl From<Tile> for u32 {
    fn from(tile: Tile) -> u32 {
        tile.0
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
