use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(20);
pub const TICK_PERIOD: Duration = Duration::from_secs(60);
pub const LOG_TAIL_LINES: usize = 100;
pub const ROTATION_CHECK_PERIOD: Duration = Duration::from_secs(30);

pub const DB_FILE: &str = "db.json";
pub const STATUS_LOG: &str = "wakeup.log";

pub fn wakeup_root(home: &Path) -> PathBuf {
    home.join(".wakeup")
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("logs")
}

pub fn status_log_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(STATUS_LOG)
}
