//! Runtime orchestration for deterministic governance games.
//!
//! This crate wires the pure step engine from `polity-core` to persistence,
//! per-game worker tasks, and an event bus. Consumers embed [`Runtime`] to
//! create and open games, then drive each one through its [`GameHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder, and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`repository`] persists snapshots and the step audit log
//! - [`replay`] re-runs an audit log and verifies its digests
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod replay;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{GameHandle, Result, RuntimeError, StepReport};
pub use events::{Event, EventBus, ResolutionEvent, StepEvent, Topic};
pub use replay::{DigestPosition, ReplayError, ReplaySummary, replay};
pub use repository::{
    AuditLog, FileAuditLog, FileGameRepository, GameRepository, InMemoryAuditLog,
    InMemoryGameRepo, RepositoryError, StepRecord, StoredGame,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
