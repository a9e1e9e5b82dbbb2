//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("game {game_id} not found")]
    NotFound { game_id: String },

    #[error("game {game_id} already exists")]
    AlreadyExists { game_id: String },

    /// Compare-and-swap lost: another writer advanced the game first.
    #[error("stale write for game {game_id}: expected step {expected}, stored step is {actual}")]
    StaleWrite {
        game_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
