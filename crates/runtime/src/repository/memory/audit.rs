//! In-memory AuditLog implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::repository::{AuditLog, RepositoryError, Result, StepRecord};

/// Keeps every record in memory, grouped by game id.
#[derive(Default)]
pub struct InMemoryAuditLog {
    records: RwLock<HashMap<String, Vec<StepRecord>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, record: &StepRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records
            .entry(record.game_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn read(&self, game_id: &str) -> Result<Vec<StepRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(game_id).cloned().unwrap_or_default())
    }
}
