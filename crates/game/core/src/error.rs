//! Error infrastructure for polity-core.
//!
//! The engine never fails on malformed actions or seeds: those degrade to
//! defaults or no-ops inside the step. The only failures surfaced to callers
//! are structural, when loosely-typed input cannot be represented as the typed
//! snapshot model at all.

/// Severity level of an error, used by callers to pick a recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// Invalid input; must be corrected upstream before retrying.
    Validation,
    /// Unexpected failure inside the engine. Indicates a bug.
    Internal,
}

/// Errors surfaced by the step engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("game state cannot be represented: {0}")]
    InvalidState(#[source] serde_json::Error),

    #[error("action batch must be an array, got {found}")]
    InvalidActions { found: &'static str },

    #[error("failed to encode game state: {0}")]
    Encode(#[source] serde_json::Error),
}

impl EngineError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidState(_) | Self::InvalidActions { .. } => ErrorSeverity::Validation,
            Self::Encode(_) => ErrorSeverity::Internal,
        }
    }

    /// Stable identifier for metrics and tests.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidActions { .. } => "invalid_actions",
            Self::Encode(_) => "encode",
        }
    }
}
