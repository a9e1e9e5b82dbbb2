//! JSON-lines AuditLog implementation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::encode_id;
use crate::repository::{AuditLog, RepositoryError, Result, StepRecord};

/// Append-only audit log with one `{hex(game_id)}.jsonl` file per game.
///
/// Each line holds one [`StepRecord`]. Appends are serialized through an
/// in-process lock and flushed before returning.
pub struct FileAuditLog {
    base_dir: PathBuf,
    append_lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            append_lock: Mutex::new(()),
        })
    }

    /// Path of the log file for `game_id`.
    pub fn log_path(&self, game_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.jsonl", encode_id(game_id)))
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, record: &StepRecord) -> Result<()> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(&record.game_id))?;
        file.write_all(&line)?;
        file.flush()?;

        tracing::trace!(game_id = %record.game_id, step = record.step, "appended audit record");
        Ok(())
    }

    fn read(&self, game_id: &str) -> Result<Vec<StepRecord>> {
        let path = self.log_path(game_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|err| {
                RepositoryError::CorruptedData(format!(
                    "{} line {}: {err}",
                    path.display(),
                    index + 1
                ))
            })?;
            records.push(record);
        }

        Ok(records)
    }
}
