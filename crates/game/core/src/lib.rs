//! Deterministic step engine and data types for the governance game.
//!
//! `polity-core` defines the canonical rules (actions, resolution, snapshot
//! model) and exposes pure APIs reused by the runtime and offline tools. All
//! state transitions flow through [`engine::GameEngine`]; the same
//! `(state, actions, seed)` triple always yields the same next snapshot.
pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod rng;
pub mod state;

pub use action::{
    ActionContext, ActionEffect, ActionKind, ActionOrdinal, ActionTransition, PayloadField,
    PlayerAction, ProposeAction, SkipReason, VoteAction, VoteReceipt,
};
pub use config::{EngineConfig, UpdatedAtPolicy};
pub use engine::{
    GameEngine, Resolution, StepOutcome, Tally, advance_game_state, decode_actions,
};
pub use error::{EngineError, ErrorSeverity};
pub use rng::{Seed, StepRng, compute_seed};
pub use state::{
    Economy, GameState, Player, PlayerId, Proposal, ProposalId, ProposalStatus, StateDigest,
    Timestamp, TurnInfo, Vote, VoteChoice,
};
