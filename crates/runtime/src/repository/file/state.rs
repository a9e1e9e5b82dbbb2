//! File-based GameRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{decode_id, encode_id};
use crate::repository::{GameRepository, RepositoryError, Result, StoredGame};

/// File-based implementation of [`GameRepository`].
///
/// Each game is stored as `{hex(game_id)}.json`. Writes go to a temporary file
/// that is renamed into place, so readers never observe a partial snapshot.
/// Compare-and-swap is serialized through an in-process lock; the repository
/// assumes it is the only process writing to `base_dir`.
pub struct FileGameRepository {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileGameRepository {
    /// Create a repository rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn game_path(&self, game_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", encode_id(game_id)))
    }

    fn read_game(&self, path: &Path) -> Result<Option<StoredGame>> {
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(path)?;
        let game: StoredGame = serde_json::from_slice(&bytes)?;
        Ok(Some(game))
    }

    fn write_game(&self, path: &Path, game: &StoredGame) -> Result<()> {
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(game)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, path)?;

        tracing::debug!(
            game_id = game.game_id(),
            step = game.step,
            path = %path.display(),
            "saved game"
        );
        Ok(())
    }
}

impl GameRepository for FileGameRepository {
    fn load(&self, game_id: &str) -> Result<Option<StoredGame>> {
        self.read_game(&self.game_path(game_id))
    }

    fn create(&self, game: &StoredGame) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let path = self.game_path(game.game_id());
        if path.exists() {
            return Err(RepositoryError::AlreadyExists {
                game_id: game.game_id().to_string(),
            });
        }
        self.write_game(&path, game)
    }

    fn swap(&self, expected_step: u64, game: &StoredGame) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let path = self.game_path(game.game_id());
        let stored = self
            .read_game(&path)?
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
        self.write_game(&path, game)
    }

    fn delete(&self, game_id: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let path = self.game_path(game_id);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!(game_id, "deleted game");
        }
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(stem) = filename.strip_suffix(".json")
                && let Some(id) = decode_id(stem)
            {
                ids.push(id);
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polity_core::{GameState, Player};
    use tempfile::TempDir;

    fn stored(id: &str, step: u64) -> StoredGame {
        let state = GameState::new(id).with_players([Player::new("p1", "Alice")]);
        StoredGame::at_step(step, state).unwrap()
    }

    #[test]
    fn round_trips_games_through_disk() {
        let dir = TempDir::new().unwrap();
        let repo = FileGameRepository::new(dir.path()).unwrap();
        let game = stored("game/1", 0);

        repo.create(&game).unwrap();

        assert_eq!(repo.load("game/1").unwrap(), Some(game));
        assert_eq!(repo.load("other").unwrap(), None);
        assert_eq!(repo.list_ids().unwrap(), ["game/1"]);
    }

    #[test]
    fn swap_detects_stale_writers() {
        let dir = TempDir::new().unwrap();
        let repo = FileGameRepository::new(dir.path()).unwrap();
        repo.create(&stored("g", 0)).unwrap();

        repo.swap(0, &stored("g", 1)).unwrap();
        let err = repo.swap(0, &stored("g", 1)).unwrap_err();

        assert!(matches!(err, RepositoryError::StaleWrite { actual: 1, .. }));
    }

    #[test]
    fn state_survives_reopening_the_directory() {
        let dir = TempDir::new().unwrap();
        {
            let repo = FileGameRepository::new(dir.path()).unwrap();
            repo.create(&stored("g", 0)).unwrap();
            repo.swap(0, &stored("g", 1)).unwrap();
        }

        let reopened = FileGameRepository::new(dir.path()).unwrap();
        assert_eq!(reopened.load("g").unwrap().map(|game| game.step), Some(1));
    }

    #[test]
    fn delete_and_create_again() {
        let dir = TempDir::new().unwrap();
        let repo = FileGameRepository::new(dir.path()).unwrap();
        repo.create(&stored("g", 0)).unwrap();

        assert!(repo.create(&stored("g", 0)).is_err());
        repo.delete("g").unwrap();
        repo.create(&stored("g", 0)).unwrap();
        assert!(repo.exists("g").unwrap());
    }
}
