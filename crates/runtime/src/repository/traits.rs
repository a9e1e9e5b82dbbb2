//! Repository contracts for persisting games and their step history.

use super::error::Result;
use super::types::{StepRecord, StoredGame};

/// Latest snapshot of each game, keyed by game id.
///
/// Writes after creation go through [`swap`](Self::swap), which only succeeds
/// when the stored step still matches what the writer last observed. Two
/// writers racing on the same game therefore cannot both commit.
pub trait GameRepository: Send + Sync {
    /// Load the stored snapshot for `game_id`, if any.
    fn load(&self, game_id: &str) -> Result<Option<StoredGame>>;

    /// Store a new game. Fails with `AlreadyExists` if the id is taken.
    fn create(&self, game: &StoredGame) -> Result<()>;

    /// Replace the stored snapshot if its step still equals `expected_step`.
    ///
    /// Fails with `StaleWrite` when another write landed first and with
    /// `NotFound` when the game was never created.
    fn swap(&self, expected_step: u64, game: &StoredGame) -> Result<()>;

    /// Remove a game. Deleting a missing game is not an error.
    fn delete(&self, game_id: &str) -> Result<()>;

    /// Ids of every stored game, sorted.
    fn list_ids(&self) -> Result<Vec<String>>;

    fn exists(&self, game_id: &str) -> Result<bool> {
        Ok(self.load(game_id)?.is_some())
    }
}

/// Append-only log of applied steps.
///
/// Each record carries the seed and actions of one step plus the digests on
/// either side of it, which is everything needed to re-run and verify the step.
pub trait AuditLog: Send + Sync {
    fn append(&self, record: &StepRecord) -> Result<()>;

    /// All records for `game_id` in append order. Unknown games yield an empty list.
    fn read(&self, game_id: &str) -> Result<Vec<StepRecord>>;
}
