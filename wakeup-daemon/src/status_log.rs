//! Append-only transition log, one line per status change.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use wakeup_core::ResourceStatus;

#[derive(Debug, Clone)]
pub struct StatusLog {
    path: PathBuf,
}

impl StatusLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `[<rfc3339>] <url> is <UP|DOWN>`.
    pub fn record(&self, url: &str, status: ResourceStatus, at: DateTime<Utc>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_line(url, status, at))
    }

    /// Last `lines` non-blank lines, oldest first. A missing file reads as
    /// empty.
    pub fn tail(&self, lines: usize) -> io::Result<Vec<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut tail = VecDeque::with_capacity(lines);
        for line in BufReader::new(file).lines() {
            let line = line?;
            if lines == 0 || line.trim().is_empty() {
                continue;
            }
            if tail.len() == lines {
                tail.pop_front();
            }
            tail.push_back(line);
        }
        Ok(tail.into())
    }
}

pub fn format_line(url: &str, status: ResourceStatus, at: DateTime<Utc>) -> String {
    format!(
        "[{}] {url} is {}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        status.to_string().to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn line_format_is_bracketed_timestamp_then_transition() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(
            format_line("https://a.test", ResourceStatus::Down, at),
            "[2024-05-01T10:00:00.000Z] https://a.test is DOWN"
        );
    }

    #[test]
    fn missing_log_tails_to_nothing() {
        let dir = TempDir::new().unwrap();
        let log = StatusLog::new(dir.path().join("logs/wakeup.log"));
        assert!(log.tail(100).unwrap().is_empty());
    }

    #[test]
    fn record_creates_directory_and_tail_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let log = StatusLog::new(dir.path().join("logs/wakeup.log"));

        for n in 0..5 {
            let status = if n % 2 == 0 {
                ResourceStatus::Up
            } else {
                ResourceStatus::Down
            };
            log.record(&format!("https://r{n}.test"), status, Utc::now())
                .unwrap();
        }

        let lines = log.tail(3).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("https://r2.test is UP"));
        assert!(lines[2].ends_with("https://r4.test is UP"));
        assert_eq!(log.tail(100).unwrap().len(), 5);
    }

    #[test]
    fn tail_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wakeup.log");
        fs::write(&path, "first\n\n   \nsecond\n\n").unwrap();

        let log = StatusLog::new(&path);
        assert_eq!(log.tail(100).unwrap(), vec!["first", "second"]);
        assert_eq!(log.tail(1).unwrap(), vec!["second"]);
    }
}
