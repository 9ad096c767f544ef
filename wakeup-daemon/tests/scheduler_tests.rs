//! Scheduler task lifecycle under paused time.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::broadcast;

use common::{registry_with, FakeProber};
use wakeup_core::ResourceStatus;
use wakeup_daemon::scheduler::scheduler_task;

#[tokio::test(start_paused = true)]
async fn startup_checks_everything_then_stops_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let prober = FakeProber::new();
    prober.set("https://b.test", ResourceStatus::Down);
    let registry = Arc::new(registry_with(
        dir.path(),
        prober.clone(),
        &["https://a.test", "https://b.test"],
    ));
    registry.update_settings(60).await.unwrap();
    for resource in registry.list_resources().await {
        registry
            .set_resource_interval(&resource.id, Some(60))
            .await
            .unwrap();
    }

    let started = tokio::time::Instant::now();
    let (shutdown, _) = broadcast::channel(1);
    let task = tokio::spawn(scheduler_task(Arc::clone(&registry), shutdown.subscribe()));

    prober.probed("https://a.test").await;
    prober.probed("https://b.test").await;
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "startup check must not wait for a minute boundary"
    );

    shutdown.send(()).unwrap();
    tokio_test::assert_ok!(task.await.expect("join"));

    let mut calls = prober.calls();
    calls.sort();
    assert_eq!(calls, ["https://a.test", "https://b.test"]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_before_startup_check_finishes_returns_ok() {
    let dir = TempDir::new().unwrap();
    let prober = FakeProber::new();
    prober.gate("https://slow.test");
    let registry = Arc::new(registry_with(dir.path(), prober.clone(), &["https://slow.test"]));

    let (shutdown, _) = broadcast::channel(1);
    let task = tokio::spawn(scheduler_task(Arc::clone(&registry), shutdown.subscribe()));
    prober.probed("https://slow.test").await;

    shutdown.send(()).unwrap();
    tokio_test::assert_ok!(task.await.expect("join"));
    assert_eq!(
        registry.list_resources().await[0].status,
        ResourceStatus::Unknown,
        "abandoned probe leaves the resource untouched"
    );
}
