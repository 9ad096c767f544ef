//! `wakeup settings`: global ping interval.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;

use wakeup_core::Settings;

use crate::client::ApiClient;

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print current settings as JSON.
    Show,
    /// Set the global ping interval in minutes (1-60).
    Set { minutes: i64 },
}

pub fn run(client: &ApiClient, command: SettingsCommand) -> Result<()> {
    let settings: Settings = match command {
        SettingsCommand::Show => client.get("/api/settings").context("failed to load settings")?,
        SettingsCommand::Set { minutes } => client
            .post("/api/settings", json!({ "pingInterval": minutes }))
            .context("failed to update settings")?,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&settings).context("failed to render settings JSON")?
    );
    Ok(())
}
