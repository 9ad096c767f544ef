//! Minute tick: pick due resources, probe them concurrently, merge results.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Timelike};
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::error::DaemonError;
use crate::paths::TICK_PERIOD;
use crate::registry::{ProbeResult, Registry};
use crate::schedule::due_resources;

/// Past each minute boundary, so the wall-clock minute read at wake-up is the
/// new one even if the timer fires marginally early.
const TICK_GRACE: Duration = Duration::from_millis(250);

/// Which resources a tick covers.
#[derive(Debug, Clone, Copy)]
pub enum Selection {
    /// Every resource regardless of interval (startup check).
    All,
    /// Resources due at the given wall-clock time.
    DueAt(DateTime<Local>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub probed: usize,
    pub changed: usize,
    /// Probe tasks that panicked or were cancelled.
    pub failed: usize,
}

/// Run one tick. Never fails; persistence errors are logged.
pub async fn run_tick(registry: &Registry, selection: Selection) -> TickReport {
    let targets: Vec<(wakeup_core::ResourceId, String)> = {
        let doc = registry.snapshot().await;
        match selection {
            Selection::All => doc
                .resources
                .iter()
                .map(|r| (r.id.clone(), r.url.clone()))
                .collect(),
            Selection::DueAt(now) => due_resources(&doc, &now)
                .into_iter()
                .map(|r| (r.id.clone(), r.url.clone()))
                .collect(),
        }
    };

    let mut report = TickReport::default();
    if targets.is_empty() {
        return report;
    }

    let prober = registry.prober();
    let mut probes = JoinSet::new();
    for (id, url) in targets {
        let prober = Arc::clone(&prober);
        probes.spawn(async move {
            let outcome = prober.probe(&url).await;
            ProbeResult { id, url, outcome }
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(err) => {
                report.failed += 1;
                tracing::error!(error = %err, "probe task failed");
            }
        }
    }
    report.probed = results.len();

    match registry.apply_results(results).await {
        Ok(changed) => report.changed = changed,
        Err(err) => tracing::error!(error = %err, "tick results kept in memory only"),
    }

    tracing::debug!(
        probed = report.probed,
        changed = report.changed,
        failed = report.failed,
        "tick complete"
    );
    report
}

/// Time from `now` until the next minute boundary plus grace.
pub fn until_next_minute<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let into_minute = Duration::from_secs(u64::from(now.second()))
        + Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));
    TICK_PERIOD.saturating_sub(into_minute) + TICK_GRACE
}

/// Scheduler task owned by the runtime: one full check at startup, then one
/// tick per wall-clock minute until shutdown.
pub async fn scheduler_task(
    registry: Arc<Registry>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    tokio::select! {
        _ = shutdown_rx.recv() => return Ok(()),
        report = run_tick(&registry, Selection::All) => {
            tracing::info!(probed = report.probed, changed = report.changed, "startup check complete");
        }
    }

    loop {
        let wait = until_next_minute(&Local::now());
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(wait) => {
                run_tick(&registry, Selection::DueAt(Local::now())).await;
            }
        }
    }

    tracing::info!("scheduler stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn next_minute_wait_lands_after_boundary() {
        let at = |s, ms| {
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 12, s).unwrap()
                + chrono::Duration::milliseconds(ms)
        };

        assert_eq!(until_next_minute(&at(0, 0)), TICK_PERIOD + TICK_GRACE);
        assert_eq!(until_next_minute(&at(30, 0)), Duration::from_secs(30) + TICK_GRACE);
        assert_eq!(
            until_next_minute(&at(59, 900)),
            Duration::from_millis(100) + TICK_GRACE
        );
    }
}
