//! Read and inspect stored games
//!
//! Loads `games/{hex(id)}.json` through the file repository and displays it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use polity_core::ProposalStatus;
use serde_json::Value;
use polity_runtime::{FileGameRepository, GameRepository, StoredGame};

use crate::dirs;

/// Read and inspect stored games
#[derive(Parser)]
pub struct ReadState {
    /// Game to read; lists all stored games when omitted
    #[arg(value_name = "GAME_ID")]
    game_id: Option<String>,

    /// Custom data directory (defaults to POLITY_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (players, proposals, votes)
    Summary,
    /// Full JSON output
    Json,
}

impl ReadState {
    pub fn execute(self) -> Result<()> {
        let data_dir = dirs::data_dir(self.data_dir)?;
        let repository = FileGameRepository::new(dirs::games_dir(&data_dir))
            .with_context(|| format!("Failed to open {}", data_dir.display()))?;

        let Some(game_id) = self.game_id else {
            let ids = repository.list_ids()?;
            println!("{} {}", style("Games in").bold().cyan(), data_dir.display());
            if ids.is_empty() {
                println!("  (none)");
            }
            for id in ids {
                println!("  {id}");
            }
            return Ok(());
        };

        let game = repository
            .load(&game_id)?
            .with_context(|| format!("Game {game_id} not found in {}", data_dir.display()))?;

        match self.format {
            OutputFormat::Summary => print_summary(&game),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&game)?),
        }

        Ok(())
    }
}

fn print_summary(game: &StoredGame) {
    let state = &game.state;

    println!("{}", style("=== Game Summary ===").bold().green());
    println!("{} {}", style("Game:").bold().cyan(), state.id);
    if let Some(name) = &state.name {
        println!("{} {}", style("Name:").bold().cyan(), name);
    }
    println!("{} {}", style("Step:").bold().cyan(), game.step);
    println!("{} {}", style("Digest:").bold().cyan(), game.digest);
    if let Some(updated_at) = &state.updated_at {
        println!("{} {}", style("Updated:").bold().cyan(), updated_at);
    }
    println!();

    println!("{}", style("Players:").bold().yellow());
    for player in &state.players {
        println!("  {} {}", player.id, style(player.display_name().unwrap_or("-")).dim());
    }
    println!();

    println!("{}", style("Proposals:").bold().yellow());
    for proposal in &state.proposals {
        let status = match proposal.status {
            ProposalStatus::Voting => style(proposal.status.as_ref()).yellow(),
            ProposalStatus::Enacted => style(proposal.status.as_ref()).green(),
            ProposalStatus::Rejected => style(proposal.status.as_ref()).red(),
        };
        let votes = state.votes_for_proposal(&proposal.id).count();
        println!(
            "  {} [{}] {} ({} votes, by {})",
            proposal.id,
            status,
            title_of(&proposal.title),
            votes,
            proposal.proposer_id
        );
    }
    println!();

    let treasury = state.economy.as_ref().and_then(|economy| economy.treasury.as_ref());
    let turn = state.turn.as_ref();
    println!(
        "{} {} votes, treasury {}, turn {} ({})",
        style("Totals:").bold().yellow(),
        state.votes.len(),
        display_or_dash(treasury),
        display_or_dash(turn.and_then(|turn| turn.turn_number.as_ref())),
        display_or_dash(turn.and_then(|turn| turn.phase.as_ref())),
    );
}

fn title_of(title: &Option<Value>) -> String {
    match title {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn display_or_dash(value: Option<&impl std::fmt::Display>) -> String {
    value.map_or_else(|| "-".to_string(), ToString::to_string)
}
