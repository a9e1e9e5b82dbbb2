//! Apply one batch of actions to a snapshot file
//!
//! Reads a game state and an action list as JSON, runs a single engine step,
//! and writes the next snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::debug;

use polity_core::{ActionEffect, GameEngine, GameState, Seed, decode_actions};

use super::{EngineArgs, read_json};

/// Apply one batch of actions to a snapshot file
#[derive(Parser)]
pub struct Step {
    /// Game state JSON file
    #[arg(value_name = "STATE")]
    state: PathBuf,

    /// Action list JSON file (omit for an empty batch)
    #[arg(short, long, value_name = "FILE")]
    actions: Option<PathBuf>,

    /// Seed; zero, blank, or non-numeric values fall back to 1
    #[arg(short, long, default_value = "1")]
    seed: String,

    /// Write the next snapshot here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print per-action effects to stderr
    #[arg(long)]
    verbose: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

impl Step {
    pub fn execute(self) -> Result<()> {
        let engine = GameEngine::new(self.engine.resolve()?);

        let state: GameState = serde_json::from_value(read_json(&self.state)?)
            .with_context(|| format!("{} is not a game state", self.state.display()))?;
        let actions = match &self.actions {
            Some(path) => decode_actions(Some(&read_json(path)?))?,
            None => Vec::new(),
        };
        let seed = Seed::parse_lenient(&self.seed);
        debug!(state = %self.state.display(), actions = actions.len(), %seed, "running step");

        let outcome = engine.advance(&state, &actions, seed);

        eprintln!(
            "{} seed {} · {} actions · {} proposals created · {} votes · {} skipped · {} resolved",
            style("Step applied:").bold().green(),
            seed,
            actions.len(),
            outcome.created_proposals().count(),
            outcome.votes_recorded(),
            outcome.skipped(),
            outcome.resolutions.len(),
        );
        if self.verbose {
            for effect in &outcome.effects {
                eprintln!("  {}", describe(effect));
            }
            for resolution in &outcome.resolutions {
                eprintln!(
                    "  {} {} → {} ({} for, {} against)",
                    style("resolved").yellow(),
                    resolution.proposal_id,
                    resolution.status,
                    resolution.tally.votes_for,
                    resolution.tally.votes_against,
                );
            }
        }

        let json = serde_json::to_string_pretty(&outcome.state)?;
        match &self.output {
            Some(path) => std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => println!("{json}"),
        }

        Ok(())
    }
}

fn describe(effect: &ActionEffect) -> String {
    match effect {
        ActionEffect::ProposalCreated {
            ordinal,
            proposal_id,
        } => format!("{ordinal} proposal created: {proposal_id}"),
        ActionEffect::VoteRecorded {
            ordinal,
            proposal_id,
            player_id,
        } => format!("{ordinal} vote recorded: {player_id} on {proposal_id}"),
        ActionEffect::Skipped {
            ordinal,
            kind,
            reason,
        } => format!("{ordinal} {kind} skipped: {reason}"),
    }
}
