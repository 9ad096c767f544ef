//! Size-based rotation for the transition log.
//!
//! `wakeup.log` is rotated once it reaches 10 MiB, keeping at most 5 copies:
//!   wakeup.log → wakeup.log.1 → … → wakeup.log.5

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Thresholds for one rotated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub max_files: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}

/// Rotate `log_path` if it has reached `policy.max_bytes`.
///
/// The oldest backup is dropped, `<name>.<n>` shifts to `<name>.<n+1>`, the
/// live file becomes `<name>.1`, and an empty live file is recreated.
///
/// Returns `Ok(false)` when the file is under the threshold or missing.
pub fn rotate_if_needed(log_path: &Path, policy: RotationPolicy) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if size < policy.max_bytes || policy.max_files == 0 {
        return Ok(false);
    }

    let oldest = numbered_path(log_path, policy.max_files);
    match fs::remove_file(&oldest) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    for n in (1..policy.max_files).rev() {
        let src = numbered_path(log_path, n);
        if src.exists() {
            fs::rename(&src, numbered_path(log_path, n + 1))?;
        }
    }

    fs::rename(log_path, numbered_path(log_path, 1))?;
    fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(log_path)?;

    Ok(true)
}

/// Rotate the transition log under `logs_dir`. Failures are logged, never
/// propagated.
pub fn rotate_status_log(logs_dir: &Path, policy: RotationPolicy) {
    let log_path = crate::paths::status_log_path(logs_dir);
    match rotate_if_needed(&log_path, policy) {
        Ok(true) => tracing::info!(path = %log_path.display(), "log file rotated"),
        Ok(false) => {}
        Err(err) => {
            tracing::warn!(path = %log_path.display(), error = %err, "log rotation failed")
        }
    }
}

fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(crate::paths::STATUS_LOG);
    base.with_file_name(format!("{name}.{n}"))
}
