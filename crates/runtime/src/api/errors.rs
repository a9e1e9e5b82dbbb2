//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and configuration
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game {game_id} not found")]
    GameNotFound { game_id: String },

    #[error("game worker command channel closed")]
    CommandChannelClosed,

    #[error("game worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("game worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to digest game state")]
    Digest(#[source] serde_json::Error),

    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
}
