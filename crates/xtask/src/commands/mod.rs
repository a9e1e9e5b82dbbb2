//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod read_log;
mod read_state;
mod replay;
mod step;

pub use read_log::ReadLog;
pub use read_state::ReadState;
pub use replay::Replay;
pub use step::Step;

use anyhow::{Context, Result};
use clap::Args;
use polity_core::{EngineConfig, UpdatedAtPolicy};
use polity_runtime::RuntimeConfig;

/// Engine settings shared by commands that run steps.
#[derive(Args)]
pub struct EngineArgs {
    /// Derive `updatedAt` from the seed instead of the wall clock
    #[arg(long)]
    seed_derived: bool,

    /// Base instant for synthetic timestamps, in Unix milliseconds
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    base_epoch_ms: Option<i64>,
}

impl EngineArgs {
    /// `POLITY_*` environment settings with command-line overrides applied.
    pub fn resolve(&self) -> Result<EngineConfig> {
        let mut config = RuntimeConfig::from_env()
            .context("Invalid POLITY_* environment")?
            .engine;

        if self.seed_derived {
            config.updated_at = UpdatedAtPolicy::SeedDerived;
        }
        if let Some(base) = self.base_epoch_ms {
            config.base_epoch_ms = base;
        }
        Ok(config)
    }
}

fn read_json(path: &std::path::Path) -> Result<serde_json::Value> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}
