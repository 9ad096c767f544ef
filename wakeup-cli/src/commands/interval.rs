//! `wakeup interval`: per-resource overrides of the global ping interval.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;

use wakeup_core::Resource;

use crate::client::ApiClient;

#[derive(Subcommand, Debug)]
pub enum IntervalCommand {
    /// Probe this resource every <minutes> (1-60) regardless of the global interval.
    Set { id: String, minutes: i64 },
    /// Go back to the global interval.
    Clear { id: String },
}

pub fn run(client: &ApiClient, command: IntervalCommand) -> Result<()> {
    match command {
        IntervalCommand::Set { id, minutes } => {
            let resource: Resource = client
                .post(
                    &format!("/api/resources/{id}/interval"),
                    json!({ "pingInterval": minutes }),
                )
                .with_context(|| format!("failed to set interval for {id}"))?;
            println!("{} ({}) every {minutes}m", resource.id, resource.url);
        }
        IntervalCommand::Clear { id } => {
            let resource: Resource = client
                .delete(&format!("/api/resources/{id}/interval"))
                .with_context(|| format!("failed to clear interval for {id}"))?;
            println!("{} ({}) follows the global interval", resource.id, resource.url);
        }
    }
    Ok(())
}
