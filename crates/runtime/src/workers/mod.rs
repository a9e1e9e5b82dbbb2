//! Worker tasks that back the runtime orchestration.
//!
//! Each live game is owned by exactly one [`GameWorker`]; all writes to that
//! game's snapshot go through its command channel.

mod game;

pub use game::{Command, GameWorker};
