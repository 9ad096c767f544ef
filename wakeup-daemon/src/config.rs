//! Runtime configuration resolved from the environment.
//!
//! | Variable                    | Default              |
//! |-----------------------------|----------------------|
//! | `WAKEUP_HOME`               | `~/.wakeup`          |
//! | `WAKEUP_DB_PATH` / `DB_PATH`| `<root>/db.json`     |
//! | `WAKEUP_LOG_DIR`            | `<root>/logs`        |
//! | `WAKEUP_BIND`               | `127.0.0.1`          |
//! | `WAKEUP_PORT`               | `3001`               |
//! | `WAKEUP_PROBE_TIMEOUT_SECS` | `20`                 |

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::paths::{
    db_path, logs_dir, status_log_path, wakeup_root, DEFAULT_PORT, LOG_TAIL_LINES, PROBE_TIMEOUT,
};

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: PathBuf,
    pub logs_dir: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
    pub probe_timeout: Duration,
    pub log_tail_lines: usize,
}

impl DaemonConfig {
    /// Defaults rooted at `<home>/.wakeup`.
    pub fn defaults_at(home: &Path) -> Self {
        let root = wakeup_root(home);
        Self {
            db_path: db_path(&root),
            logs_dir: logs_dir(&root),
            bind: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            probe_timeout: PROBE_TIMEOUT,
            log_tail_lines: LOG_TAIL_LINES,
        }
    }

    /// Resolve from the process environment.
    pub fn from_env(home: &Path) -> Self {
        Self::from_lookup(home, |key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(home: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let root = lookup("WAKEUP_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| wakeup_root(home));
        let defaults = Self::defaults_at(home);

        let db_path = lookup("WAKEUP_DB_PATH")
            .or_else(|| lookup("DB_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::paths::db_path(&root));
        let logs_dir = lookup("WAKEUP_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::paths::logs_dir(&root));

        Self {
            db_path,
            logs_dir,
            bind: parse_or(&lookup, "WAKEUP_BIND", defaults.bind),
            port: parse_or(&lookup, "WAKEUP_PORT", defaults.port),
            probe_timeout: probe_timeout(&lookup, defaults.probe_timeout),
            log_tail_lines: defaults.log_tail_lines,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn status_log_path(&self) -> PathBuf {
        status_log_path(&self.logs_dir)
    }
}

/// A zero timeout would fail every probe instantly, so it is rejected like
/// any other unparseable value.
fn probe_timeout(lookup: &impl Fn(&str) -> Option<String>, default: Duration) -> Duration {
    let default = NonZeroU64::new(default.as_secs()).unwrap_or(NonZeroU64::MIN);
    Duration::from_secs(parse_or(lookup, "WAKEUP_PROBE_TIMEOUT_SECS", default).get())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, fallback = %default, "ignoring invalid environment value");
            default
        }),
        None => default,
    }
}

impl fmt::Display for DaemonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "document:      {}", self.db_path.display())?;
        writeln!(f, "logs:          {}", self.logs_dir.display())?;
        writeln!(f, "listen:        {}", self.socket_addr())?;
        write!(f, "probe timeout: {}s", self.probe_timeout.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::DEFAULT_BIND;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_live_under_dot_wakeup() {
        let cfg = DaemonConfig::from_lookup(Path::new("/home/u"), lookup_from(&[]));
        assert_eq!(cfg.db_path, PathBuf::from("/home/u/.wakeup/db.json"));
        assert_eq!(cfg.logs_dir, PathBuf::from("/home/u/.wakeup/logs"));
        assert_eq!(cfg.socket_addr().to_string(), format!("{DEFAULT_BIND}:{DEFAULT_PORT}"));
        assert_eq!(cfg.probe_timeout, PROBE_TIMEOUT);
        assert_eq!(cfg.log_tail_lines, 100);
    }

    #[test]
    fn wakeup_home_moves_every_default_path() {
        let cfg = DaemonConfig::from_lookup(
            Path::new("/home/u"),
            lookup_from(&[("WAKEUP_HOME", "/srv/wakeup")]),
        );
        assert_eq!(cfg.db_path, PathBuf::from("/srv/wakeup/db.json"));
        assert_eq!(cfg.status_log_path(), PathBuf::from("/srv/wakeup/logs/wakeup.log"));
    }

    #[test]
    fn legacy_db_path_variable_is_honoured() {
        let cfg = DaemonConfig::from_lookup(
            Path::new("/home/u"),
            lookup_from(&[("DB_PATH", "/tmp/legacy.json")]),
        );
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/legacy.json"));

        let cfg = DaemonConfig::from_lookup(
            Path::new("/home/u"),
            lookup_from(&[("DB_PATH", "/tmp/legacy.json"), ("WAKEUP_DB_PATH", "/tmp/new.json")]),
        );
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/new.json"), "new name wins");
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let cfg = DaemonConfig::from_lookup(
            Path::new("/home/u"),
            lookup_from(&[
                ("WAKEUP_PORT", "not-a-port"),
                ("WAKEUP_PROBE_TIMEOUT_SECS", "5"),
                ("WAKEUP_BIND", "0.0.0.0"),
            ]),
        );
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.probe_timeout, Duration::from_secs(5));
        assert_eq!(cfg.bind.to_string(), "0.0.0.0");

        for raw in ["0", "-3", "soon"] {
            let cfg = DaemonConfig::from_lookup(
                Path::new("/home/u"),
                lookup_from(&[("WAKEUP_PROBE_TIMEOUT_SECS", raw)]),
            );
            assert_eq!(cfg.probe_timeout, PROBE_TIMEOUT, "{raw}");
        }
    }
}
