//! Development tasks for the polity workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{ReadLog, ReadState, Replay, Step};
use tracing_subscriber::EnvFilter;

/// Development tasks for the polity workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for polity games", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Apply one batch of actions to a snapshot file
    Step(Step),

    /// Replay a game's audit log and verify its digests
    Replay(Replay),

    /// Read and inspect stored games
    ReadState(ReadState),

    /// Read and inspect a game's audit log
    ReadLog(ReadLog),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for POLITY_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Step(cmd) => cmd.execute(),
        Command::Replay(cmd) => cmd.execute(),
        Command::ReadState(cmd) => cmd.execute(),
        Command::ReadLog(cmd) => cmd.execute(),
    }
}

/// `RUST_LOG` decides on its own when set and valid; otherwise only warnings show.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_replaces_the_default() {
        assert_eq!(log_filter(Some("polity=debug")).to_string(), "polity=debug");
        assert_eq!(log_filter(None).to_string(), "warn");
    }
}
