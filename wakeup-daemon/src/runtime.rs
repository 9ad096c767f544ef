use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use wakeup_core::DocumentStore;

use crate::config::DaemonConfig;
use crate::error::{io_err, DaemonError};
use crate::http::{router, AppState};
use crate::log_rotation::{rotate_status_log, RotationPolicy};
use crate::paths::ROTATION_CHECK_PERIOD;
use crate::prober::HttpProber;
use crate::registry::Registry;
use crate::scheduler::scheduler_task;
use crate::status_log::StatusLog;

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(config: DaemonConfig) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run scheduler, HTTP server, log rotation and signal handling until one of
/// them stops or ctrl-c arrives.
pub async fn run(config: DaemonConfig) -> Result<(), DaemonError> {
    fs::create_dir_all(&config.logs_dir).map_err(|e| io_err(&config.logs_dir, e))?;

    let status_log = StatusLog::new(config.status_log_path());
    let prober = HttpProber::new(config.probe_timeout)?;
    let registry = Arc::new(
        Registry::open(DocumentStore::new(&config.db_path), Arc::new(prober))
            .with_status_log(status_log.clone()),
    );

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| DaemonError::Bind { addr, source })?;
    tracing::info!(%addr, db = %config.db_path.display(), "wakeup daemon listening");

    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let result = scheduler_task(registry, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let http_handle = {
        let shutdown = shutdown_tx.clone();
        let state = AppState {
            registry: Arc::clone(&registry),
            status_log,
            log_tail_lines: config.log_tail_lines,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            let result = axum::serve(listener, router(state))
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .map_err(|e| io_err(format!("http server on {addr}"), e));
            let _ = shutdown.send(());
            result
        })
    };

    let rotation_handle = {
        let shutdown = shutdown_tx.clone();
        let logs_dir = config.logs_dir.clone();
        tokio::spawn(async move {
            let result = log_rotation_task(logs_dir, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Task {
                            task: "signal_handler",
                            message: format!("ctrl-c handler failed: {err}"),
                        }),
                    }
                }
            }
        })
    };

    let (scheduler_result, http_result, rotation_result, signal_result) = tokio::join!(
        scheduler_handle,
        http_handle,
        rotation_handle,
        signal_handle
    );

    handle_join("scheduler", scheduler_result)?;
    handle_join("http_server", http_result)?;
    handle_join("log_rotation", rotation_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("wakeup daemon stopped");
    Ok(())
}

async fn log_rotation_task(
    logs_dir: PathBuf,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut interval = tokio::time::interval(ROTATION_CHECK_PERIOD);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    interval.tick().await; // first tick is immediate

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                let logs_dir = logs_dir.clone();
                // rotation failures are logged inside
                tokio::task::spawn_blocking(move || {
                    rotate_status_log(&logs_dir, RotationPolicy::default());
                })
                .await
                .ok();
            }
        }
    }
    Ok(())
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task {
            task,
            message: format!("join failure: {err}"),
        }),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
