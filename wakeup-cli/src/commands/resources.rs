//! `wakeup resources`: list and edit monitored endpoints.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::{json, Value};
use tabled::{settings::Style, Table, Tabled};

use wakeup_core::{Resource, ResourceStatus, Settings};

use crate::client::ApiClient;

#[derive(Subcommand, Debug)]
pub enum ResourcesCommand {
    /// List monitored resources.
    List(ListArgs),
    /// Start monitoring a URL (probed immediately).
    Add { url: String },
    /// Stop monitoring a resource.
    Remove { id: String },
    /// Point an existing resource at a new URL.
    SetUrl { id: String, url: String },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "url")]
    url: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "last checked")]
    last_checked: String,
    #[tabled(rename = "interval")]
    interval: String,
}

pub fn run(client: &ApiClient, command: ResourcesCommand) -> Result<()> {
    match command {
        ResourcesCommand::List(args) => {
            let resources: Vec<Resource> = client
                .get("/api/resources")
                .context("failed to list resources")?;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&resources)
                        .context("failed to serialize resources JSON")?
                );
                return Ok(());
            }
            let settings: Settings = client
                .get("/api/settings")
                .context("failed to load settings")?;
            print_table(&resources, &settings, Utc::now());
        }
        ResourcesCommand::Add { url } => {
            let resource: Resource = client
                .post("/api/resources", json!({ "url": url }))
                .with_context(|| format!("failed to add {url}"))?;
            println!("added {} {} ({})", resource.id, resource.url, status_label(resource.status));
        }
        ResourcesCommand::Remove { id } => {
            let _: Value = client
                .delete(&format!("/api/resources/{id}"))
                .with_context(|| format!("failed to remove {id}"))?;
            println!("removed {id}");
        }
        ResourcesCommand::SetUrl { id, url } => {
            let resource: Resource = client
                .put(&format!("/api/resources/{id}"), json!({ "url": url }))
                .with_context(|| format!("failed to update {id}"))?;
            println!("{} now {} ({})", resource.id, resource.url, status_label(resource.status));
        }
    }
    Ok(())
}

fn print_table(resources: &[Resource], settings: &Settings, now: DateTime<Utc>) {
    if resources.is_empty() {
        println!("No resources monitored. Add one with 'wakeup resources add <url>'.");
        return;
    }

    let up = resources
        .iter()
        .filter(|r| r.status == ResourceStatus::Up)
        .count();
    println!(
        "WakeUp v{} | {} resources | {} up | every {} by default",
        env!("CARGO_PKG_VERSION"),
        resources.len(),
        up,
        settings.ping_interval,
    );

    let rows: Vec<ResourceRow> = resources
        .iter()
        .map(|r| ResourceRow {
            id: r.id.to_string(),
            url: r.url.clone(),
            status: status_label(r.status),
            last_checked: r
                .last_checked
                .map(|at| format_age(now, at))
                .unwrap_or_else(|| "never".to_string()),
            interval: match r.ping_interval {
                Some(own) => own.to_string(),
                None => format!("{} (global)", settings.ping_interval),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn status_label(status: ResourceStatus) -> String {
    let label = status.to_string().to_uppercase();
    match status {
        ResourceStatus::Up => label.green().bold().to_string(),
        ResourceStatus::Down => label.red().bold().to_string(),
        ResourceStatus::Unknown => label.bright_black().to_string(),
    }
}

fn format_age(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
