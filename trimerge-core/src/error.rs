//! Error types for board and turn operations

/// Errors raised by the board, the resolvers and the turn engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("index {index} is outside the board (capacity {capacity})")]
    OutOfRange { index: usize, capacity: usize },

    #[error("no tile at index {index}")]
    MissingTile { index: usize },

    #[error("index {index} is already occupied")]
    Occupied { index: usize },

    #[error("board is full")]
    BoardFull,

    #[error("invalid tile value: {0} is not a power of two")]
    InvalidTileValue(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("a turn is already being resolved")]
    TurnInProgress,
}

pub type Result<T> = std::result::Result<T, GameError>;
