//! `wakeup logs`: recent status transitions from the daemon.

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use crate::client::ApiClient;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Number of trailing lines to show (the daemon keeps the last 100 available).
    #[arg(long, default_value_t = 100)]
    pub lines: usize,
}

#[derive(Deserialize)]
struct LogsResponse {
    logs: Vec<String>,
}

impl LogsArgs {
    pub fn run(self, client: &ApiClient) -> Result<()> {
        let response: LogsResponse = client.get("/api/logs").context("failed to fetch logs")?;
        if response.logs.is_empty() {
            println!("no status transitions recorded yet");
            return Ok(());
        }
        let skip = response.logs.len().saturating_sub(self.lines);
        for line in &response.logs[skip..] {
            println!("{line}");
        }
        Ok(())
    }
}
