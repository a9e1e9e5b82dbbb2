//! Platform-specific directory utilities
//!
//! Resolves where games and audit logs live, following platform conventions
//! unless overridden.

use std::path::PathBuf;

use anyhow::{Context, Result};
use polity_runtime::RuntimeConfig;

/// Resolve the data directory.
///
/// Precedence: explicit `--data-dir`, then `POLITY_DATA_DIR`, then the
/// platform data directory:
/// - macOS: `~/Library/Application Support/polity`
/// - Linux: `~/.local/share/polity` (or `$XDG_DATA_HOME/polity`)
/// - Windows: `%APPDATA%\polity`
/// - Fallback: `./polity_data`
pub fn data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }

    let config = RuntimeConfig::from_env().context("Invalid POLITY_* environment")?;
    if let Some(dir) = config.data_dir {
        return Ok(dir);
    }

    Ok(directories::ProjectDirs::from("", "", "polity")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./polity_data")))
}

/// Directory holding one JSON file per stored game.
pub fn games_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("games")
}

/// Directory holding one JSON-lines audit log per game.
pub fn audit_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("audit")
}
