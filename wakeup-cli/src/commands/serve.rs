//! `wakeup serve`: run the daemon in the foreground.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wakeup_daemon::{start_blocking, DaemonConfig};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides WAKEUP_BIND).
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Port to listen on (overrides WAKEUP_PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Document path (overrides WAKEUP_DB_PATH).
    #[arg(long)]
    pub db: Option<PathBuf>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = self.apply(DaemonConfig::from_env(&home));
        eprintln!("{config}");
        start_blocking(config).context("daemon exited with error")
    }

    fn apply(self, mut config: DaemonConfig) -> DaemonConfig {
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(db) = self.db {
            config.db_path = db;
        }
        config
    }
}
