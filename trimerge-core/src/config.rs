//! Game configuration

use std::path::Path;

use anyhow::Context;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::matcher::DEFAULT_MATCH_THRESHOLD;
use crate::tile::Tile;

/// How a merge adds to the score
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Root value (before the upgrade) times run length
    #[default]
    CountTimesValue,
    /// Sum of every tile value in the run
    SumOfValues,
}

impl ScoringPolicy {
    /// Points for merging `absorbed` into `root`
    pub fn score(self, root: Tile, absorbed: &[Tile]) -> u64 {
        match self {
            ScoringPolicy::CountTimesValue => u64::from(root.value()) * (absorbed.len() as u64 + 1),
            ScoringPolicy::SumOfValues => absorbed
                .iter()
                .fold(u64::from(root.value()), |sum, tile| sum + u64::from(tile.value())),
        }
    }
}

/// Tile placed before the first turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialTile {
    pub index: usize,
    pub value: Tile,
}

/// Session configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Minimum run length that merges
    pub match_threshold: usize,
    pub scoring: ScoringPolicy,
    pub initial_tiles: Vec<InitialTile>,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            scoring: ScoringPolicy::default(),
            initial_tiles: [8, 12, 13]
                .into_iter()
                .map(|index| InitialTile { index, value: Tile::TWO })
                .collect(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Resize the board; starting tiles that no longer fit are dropped
    pub fn with_dimensions(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self.initial_tiles
            .retain(|tile| tile.index < rows.saturating_mul(cols));
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringPolicy) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_initial_tiles(mut self, tiles: Vec<InitialTile>) -> Self {
        self.initial_tiles = tiles;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::InvalidConfig(format!(
                "board dimensions must be non-zero, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.match_threshold < 2 {
            return Err(GameError::InvalidConfig(format!(
                "match threshold must be at least 2, got {}",
                self.match_threshold
            )));
        }

        let capacity = self.rows.checked_mul(self.cols).ok_or_else(|| {
            GameError::InvalidConfig(format!(
                "board dimensions overflow: {}x{}",
                self.rows, self.cols
            ))
        })?;
        let mut seen = FxHashSet::default();
        for tile in &self.initial_tiles {
            if tile.index >= capacity {
                return Err(GameError::OutOfRange {
                    index: tile.index,
                    capacity,
                });
            }
            if !seen.insert(tile.index) {
                return Err(GameError::InvalidConfig(format!(
                    "duplicate starting tile at index {}",
                    tile.index
                )));
            }
        }
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
