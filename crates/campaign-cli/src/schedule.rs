//! Read-only view of the scheduler's persisted state.

use std::path::Path;

use campaign_core::{AppConfig, StateStore};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum ScheduleCommands {
    /// Print the persisted scheduler state as JSON
    Status,
}

/// Renders the state stored at `path`; a missing file reads as inactive.
pub(crate) fn render_status(path: &Path) -> anyhow::Result<String> {
    let state = StateStore::new(path).load()?;
    Ok(serde_json::to_string_pretty(&state)?)
}

pub(crate) fn run_status(config: &AppConfig) -> anyhow::Result<()> {
    println!("{}", render_status(&config.state_path)?);
    Ok(())
}
