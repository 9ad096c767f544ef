//! WakeUp: keep remote endpoints awake by probing them on a schedule.
//!
//! # Usage
//!
//! ```text
//! wakeup serve [--bind <ip>] [--port <port>] [--db <path>]
//! wakeup resources list [--json]
//! wakeup resources add <url>
//! wakeup resources remove <id>
//! wakeup resources set-url <id> <url>
//! wakeup interval set <id> <minutes>
//! wakeup interval clear <id>
//! wakeup settings show|set <minutes>
//! wakeup logs [--lines <n>]
//! ```

mod client;
mod commands;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wakeup_daemon::paths::PROBE_TIMEOUT;
use wakeup_daemon::DaemonConfig;

use client::{request_timeout, ApiClient};
use commands::{
    interval::IntervalCommand, logs::LogsArgs, resources::ResourcesCommand, serve::ServeArgs,
    settings::SettingsCommand,
};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3001";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "wakeup",
    version,
    about = "Keep remote endpoints awake by probing them on a schedule",
    long_about = None,
)]
struct Cli {
    /// Base URL of the running daemon.
    #[arg(long, global = true, env = "WAKEUP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Request timeout in seconds. Defaults to the probe timeout plus a
    /// margin, since adding a resource waits for its first probe.
    #[arg(long, global = true, env = "WAKEUP_CLIENT_TIMEOUT_SECS", value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the daemon in the foreground (scheduler + HTTP API).
    Serve(ServeArgs),

    /// Manage monitored resources.
    Resources {
        #[command(subcommand)]
        command: ResourcesCommand,
    },

    /// Manage per-resource ping interval overrides.
    Interval {
        #[command(subcommand)]
        command: IntervalCommand,
    },

    /// Show or change the global ping interval.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Print recent status transitions.
    Logs(LogsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = || ApiClient::new(&cli.server, request_timeout(cli.timeout, probe_timeout()));
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Resources { command } => commands::resources::run(&client(), command),
        Commands::Interval { command } => commands::interval::run(&client(), command),
        Commands::Settings { command } => commands::settings::run(&client(), command),
        Commands::Logs(args) => args.run(&client()),
    }
}

/// The daemon's probe timeout as this environment would configure it.
fn probe_timeout() -> Duration {
    dirs::home_dir()
        .map(|home| DaemonConfig::from_env(&home).probe_timeout)
        .unwrap_or(PROBE_TIMEOUT)
}
