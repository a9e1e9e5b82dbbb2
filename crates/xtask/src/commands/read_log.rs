//! Read and inspect a game's audit log
//!
//! Reads `audit/{hex(id)}.jsonl` through the file audit log and displays it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use polity_runtime::{AuditLog, FileAuditLog, StepRecord};

use crate::dirs;

/// Read and inspect a game's audit log
#[derive(Parser)]
pub struct ReadLog {
    #[arg(value_name = "GAME_ID")]
    game_id: String,

    /// Custom data directory (defaults to POLITY_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Limit number of records to display (0 = unlimited)
    #[arg(short, long, default_value = "100")]
    limit: usize,

    /// Skip first N records
    #[arg(long, default_value = "0")]
    skip: usize,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (step count and action type totals)
    Summary,
    /// One line per step
    List,
    /// Full JSON output
    Json,
}

impl ReadLog {
    pub fn execute(self) -> Result<()> {
        let data_dir = dirs::data_dir(self.data_dir)?;
        let log = FileAuditLog::new(dirs::audit_dir(&data_dir))
            .with_context(|| format!("Failed to open {}", data_dir.display()))?;

        let records = log.read(&self.game_id)?;
        println!(
            "{} {}",
            style("Audit Log:").bold().cyan(),
            log.log_path(&self.game_id).display()
        );
        println!("{} {}", style("Steps:").bold().cyan(), records.len());
        println!();

        let limit = if self.limit == 0 { usize::MAX } else { self.limit };
        let window: Vec<&StepRecord> = records.iter().skip(self.skip).take(limit).collect();

        match self.format {
            OutputFormat::Summary => print_summary(&window),
            OutputFormat::List => print_list(&window),
            OutputFormat::Json => {
                for record in window {
                    println!("{}", serde_json::to_string(record)?);
                }
            }
        }

        Ok(())
    }
}

fn print_summary(records: &[&StepRecord]) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        for action in &record.actions {
            let name = action.type_name().unwrap_or("<untyped>").to_string();
            *counts.entry(name).or_default() += 1;
        }
    }

    println!("{}", style("Action types:").bold().yellow());
    if counts.is_empty() {
        println!("  (none)");
    }
    for (name, count) in counts {
        println!("  {name:<16} {count}");
    }
}

fn print_list(records: &[&StepRecord]) {
    for record in records {
        println!(
            "{} seed {:<10} actions {:<3} {} → {}",
            style(format!("step {:>5}", record.step)).bold(),
            record.seed,
            record.actions.len(),
            style(short(&record.digest_before.to_hex())).dim(),
            short(&record.digest_after.to_hex()),
        );
    }
}

fn short(hex: &str) -> &str {
    &hex[..hex.len().min(12)]
}
