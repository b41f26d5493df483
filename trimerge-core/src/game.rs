//! Game session and turn resolution
//!
//! ## Architecture
//! - Level 1: `GameSession::play_turn()` - one swipe from input to spawn
//! - Level 2: `resolve_turn()` - move/match loop until settlement
//! - Level 3: `commit_merges()`, `spawn()`
//! - Level 4: `next_tile_value()`
//!
//! All board mutation happens synchronously inside `play_turn`. The returned
//! [`TurnOutcome`] lists every committed change as [`TurnEvent`]s in commit
//! order so a renderer can replay them at its own pace.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Direction};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::matcher::{compute_matches, MatchReport};
use crate::movement::{apply_moves, resolve_moves};
use crate::tile::Tile;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Where the session is in its turn cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Idle,
    Resolving,
    Moving,
    Matching,
    Spawning,
}

/// A committed board change, for the animation layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnEvent {
    /// Tile slid from one cell to another
    Move { from: usize, to: usize },
    /// Tiles at `absorbed` collapsed into `root`
    Merge {
        root: usize,
        absorbed: Vec<usize>,
        new_value: Tile,
    },
    /// Root tile took its merged value
    Upgrade { index: usize, value: Tile },
    /// New tile appeared after settlement
    Spawn { index: usize, value: Tile },
}

/// What happened at the end of a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnOutcome {
    /// Swipe changed nothing, so nothing spawned
    Skipped,
    Spawned { index: usize, value: Tile },
    /// No free cell was left after settlement
    BoardFull,
}

/// Result of one swipe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub direction: Direction,
    /// Tile slides across all loop iterations
    pub moves: usize,
    /// Runs merged across all loop iterations
    pub merges: usize,
    pub score_gained: u64,
    pub spawn: SpawnOutcome,
    pub events: Vec<TurnEvent>,
}

impl TurnOutcome {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            moves: 0,
            merges: 0,
            score_gained: 0,
            spawn: SpawnOutcome::Skipped,
            events: Vec::new(),
        }
    }

    /// Whether the swipe moved or merged anything
    pub fn changed(&self) -> bool {
        self.moves > 0 || self.merges > 0
    }
}

// ============================================================================
// GAME SESSION
// ============================================================================

/// One game: the board, its counters and the random source for spawns
#[derive(Clone, Debug)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    rng: ChaCha8Rng,
    phase: TurnPhase,
    total_score: u64,
    /// Swipes that changed the board
    total_moves: u64,
}

impl GameSession {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh game with the configured starting tiles
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let mut board = Board::new(config.rows, config.cols)?;
        for tile in &config.initial_tiles {
            board.set(tile.index, tile.value)?;
        }
        Ok(Self::assemble(config, board))
    }

    /// Game resumed from an existing board; its dimensions override the config's
    pub fn with_board(mut config: GameConfig, board: Board) -> Result<Self> {
        config.rows = board.rows();
        config.cols = board.cols();
        config.initial_tiles.clear();
        config.validate()?;
        Ok(Self::assemble(config, board))
    }

    fn assemble(config: GameConfig, board: Board) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            board,
            rng,
            phase: TurnPhase::Idle,
            total_score: 0,
            total_moves: 0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn total_moves(&self) -> u64 {
        self.total_moves
    }

    pub fn max_tile(&self) -> Option<Tile> {
        self.board.max_tile()
    }

    /// Whether any direction would move or merge a tile
    pub fn has_legal_turn(&self) -> Result<bool> {
        for direction in Direction::ALL {
            if !resolve_moves(&self.board, direction)?.is_empty() {
                return Ok(true);
            }
            let report = compute_matches(&self.board, direction, self.config.match_threshold);
            if report.mergeable().next().is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ========================================================================
    // LEVEL 1 - TURN
    // ========================================================================

    /// Enter `Resolving`; fails if a turn is already running
    fn begin_turn(&mut self) -> Result<()> {
        if self.phase != TurnPhase::Idle {
            return Err(GameError::TurnInProgress);
        }
        self.phase = TurnPhase::Resolving;
        Ok(())
    }

    fn finish_turn(&mut self) {
        self.phase = TurnPhase::Idle;
    }

    /// Resolve one swipe to settlement, then spawn a tile if anything changed
    ///
    /// A full board after settlement is reported as [`SpawnOutcome::BoardFull`].
    /// Any error returned here is an invariant violation.
    pub fn play_turn(&mut self, direction: Direction) -> Result<TurnOutcome> {
        self.begin_turn()?;
        let result = self.resolve_turn(direction);
        self.finish_turn();
        result
    }

    // ========================================================================
    // LEVEL 2 - RESOLUTION LOOP
    // ========================================================================

    fn resolve_turn(&mut self, direction: Direction) -> Result<TurnOutcome> {
        let mut outcome = TurnOutcome::new(direction);

        loop {
            self.phase = TurnPhase::Moving;
            let moves = resolve_moves(&self.board, direction)?;
            apply_moves(&mut self.board, &moves)?;
            outcome
                .events
                .extend(moves.iter().map(|mv| TurnEvent::Move { from: mv.from, to: mv.to }));
            outcome.moves += moves.len();

            self.phase = TurnPhase::Matching;
            let report = compute_matches(&self.board, direction, self.config.match_threshold);
            let merged = self.commit_merges(&report, &mut outcome)?;

            tracing::debug!(?direction, moves = moves.len(), merged, "resolution pass");

            if moves.is_empty() && merged == 0 {
                break;
            }
        }

        if !outcome.changed() {
            return Ok(outcome);
        }

        self.total_moves += 1;
        self.total_score += outcome.score_gained;

        self.phase = TurnPhase::Spawning;
        outcome.spawn = self.spawn()?;
        if let SpawnOutcome::Spawned { index, value } = outcome.spawn {
            outcome.events.push(TurnEvent::Spawn { index, value });
        }

        Ok(outcome)
    }

    // ========================================================================
    // LEVEL 3 - COMMITS
    // ========================================================================

    /// Merge every run `report` allows this pass; returns the number merged
    ///
    /// A run is skipped when one of its tiles was already deleted earlier in
    /// the pass, or when its root was already upgraded; a later scan picks it
    /// up again if it still qualifies. Scores use the tile values the runs
    /// were detected with, so a junction upgraded by an earlier run in the
    /// pass is not counted at its new value.
    fn commit_merges(&mut self, report: &MatchReport, outcome: &mut TurnOutcome) -> Result<usize> {
        let mut deleted: FxHashSet<usize> = FxHashSet::default();
        let mut upgraded: FxHashSet<usize> = FxHashSet::default();
        let mut merged = 0;
        let detected = self.board.clone();

        for run in report.mergeable() {
            let Some(root) = run.root() else { continue };
            if upgraded.contains(&root) || run.indices.iter().any(|i| deleted.contains(i)) {
                tracing::trace!(indices = ?run.indices, "run deferred");
                continue;
            }

            let root_tile = detected
                .get(root)
                .ok_or(GameError::MissingTile { index: root })?;
            let absorbed = run
                .non_root()
                .iter()
                .map(|&index| detected.get(index).ok_or(GameError::MissingTile { index }))
                .collect::<Result<Vec<Tile>>>()?;

            for &index in run.non_root() {
                self.board.delete(index);
                deleted.insert(index);
            }
            let new_value = root_tile.upgraded();
            self.board.set(root, new_value)?;
            upgraded.insert(root);

            outcome.score_gained += self.config.scoring.score(root_tile, &absorbed);
            outcome.events.push(TurnEvent::Merge {
                root,
                absorbed: run.non_root().to_vec(),
                new_value,
            });
            outcome.events.push(TurnEvent::Upgrade {
                index: root,
                value: new_value,
            });
            merged += 1;
        }

        let blocked = report.blocked().count();
        if blocked > 0 {
            tracing::trace!(blocked, "blocked runs left for a later pass");
        }

        outcome.merges += merged;
        Ok(merged)
    }

    fn spawn(&mut self) -> Result<SpawnOutcome> {
        let index = match self.board.random_unoccupied_index(&mut self.rng) {
            Ok(index) => index,
            Err(GameError::BoardFull) => {
                tracing::debug!("no free cell to spawn into");
                return Ok(SpawnOutcome::BoardFull);
            }
            Err(e) => return Err(e),
        };
        let value = next_tile_value(&self.board, &mut self.rng);
        self.board.set(index, value)?;
        Ok(SpawnOutcome::Spawned { index, value })
    }
}

// ============================================================================
// LEVEL 4 - SPAWN POLICY
// ============================================================================

/// Value for the next spawned tile
///
/// While nothing bigger than the smallest tile exists only the smallest tile
/// spawns; afterwards it is an even pick between the two lowest values.
pub fn next_tile_value<R: Rng>(board: &Board, rng: &mut R) -> Tile {
    match board.max_tile() {
        Some(max) if max > Tile::TWO => {
            if rng.gen_bool(0.5) {
                Tile::FOUR
            } else {
                Tile::TWO
            }
        }
        _ => Tile::TWO,
    }
}

// ============================================================================
// TESTS
// ============================================================================
