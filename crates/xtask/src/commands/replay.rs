//! Replay a game's audit log and verify its digests
//!
//! The repository keeps only the latest snapshot, so the initial state the
//! game was created with must be supplied.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use console::style;

use polity_core::{GameEngine, GameState};
use polity_runtime::{AuditLog, FileAuditLog, FileGameRepository, GameRepository, replay};

use super::{EngineArgs, read_json};
use crate::dirs;

/// Replay a game's audit log and verify its digests
#[derive(Parser)]
pub struct Replay {
    #[arg(value_name = "GAME_ID")]
    game_id: String,

    /// Initial game state JSON file the game was created from
    #[arg(short, long, value_name = "FILE")]
    initial: PathBuf,

    /// Custom data directory (defaults to POLITY_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let engine = GameEngine::new(self.engine.resolve()?);
        let data_dir = dirs::data_dir(self.data_dir)?;

        let initial: GameState = serde_json::from_value(read_json(&self.initial)?)
            .with_context(|| format!("{} is not a game state", self.initial.display()))?;
        let records = FileAuditLog::new(dirs::audit_dir(&data_dir))?.read(&self.game_id)?;
        if records.is_empty() {
            bail!("No audit records for game {} in {}", self.game_id, data_dir.display());
        }

        let summary = replay(&engine, &initial, &records)
            .with_context(|| format!("Replay of {} failed", self.game_id))?;

        println!(
            "{} {} steps, digest {}",
            style("Replay verified:").bold().green(),
            summary.steps,
            summary.digest
        );

        let stored = FileGameRepository::new(dirs::games_dir(&data_dir))?.load(&self.game_id)?;
        match stored {
            Some(game) if game.step == summary.steps && game.digest == summary.digest => {
                println!("{} stored snapshot matches", style("✓").green());
            }
            Some(game) => bail!(
                "Stored snapshot is at step {} with digest {}, replay ended at step {} with digest {}",
                game.step,
                game.digest,
                summary.steps,
                summary.digest
            ),
            None => println!("{} no stored snapshot to compare", style("!").yellow()),
        }

        Ok(())
    }
}
