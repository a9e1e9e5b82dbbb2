//! In-memory GameRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::repository::{GameRepository, RepositoryError, Result, StoredGame};

/// In-memory implementation of [`GameRepository`].
///
/// The write lock is held across the step comparison in `swap`, so the
/// compare-and-swap is atomic with respect to other writers.
#[derive(Default)]
pub struct InMemoryGameRepo {
    games: RwLock<HashMap<String, StoredGame>>,
}

impl InMemoryGameRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for InMemoryGameRepo {
    fn load(&self, game_id: &str) -> Result<Option<StoredGame>> {
        let games = self
            .games
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(games.get(game_id).cloned())
    }

    fn create(&self, game: &StoredGame) -> Result<()> {
        let mut games = self
            .games
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if games.contains_key(game.game_id()) {
            return Err(RepositoryError::AlreadyExists {
                game_id: game.game_id().to_string(),
            });
        }
        games.insert(game.game_id().to_string(), game.clone());
        Ok(())
    }

    fn swap(&self, expected_step: u64, game: &StoredGame) -> Result<()> {
        let mut games = self
            .games
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let stored = games
            .get_mut(game.game_id())
            .ok_or_else(|| RepositoryError::NotFound {
                game_id: game.game_id().to_string(),
            })?;

        if stored.step != expected_step {
            return Err(RepositoryError::StaleWrite {
                game_id: game.game_id().to_string(),
                expected: expected_step,
                actual: stored.step,
            });
        }

        *stored = game.clone();
        Ok(())
    }

    fn delete(&self, game_id: &str) -> Result<()> {
        let mut games = self
            .games
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        games.remove(game_id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let games = self
            .games
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<String> = games.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
