//! Repository layer for data that changes as games advance.
//!
//! - [`GameRepository`]: latest snapshot of each game, versioned by step
//!   counter and written with compare-and-swap
//! - [`AuditLog`]: append-only record of every applied step, for replay
//!
//! In-memory implementations back tests and ephemeral runs; file-backed
//! implementations persist under a data directory.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::{FileAuditLog, FileGameRepository};
pub use memory::{InMemoryAuditLog, InMemoryGameRepo};
pub use traits::{AuditLog, GameRepository};
pub use types::{StepRecord, StoredGame};
