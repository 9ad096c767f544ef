//! WakeUp daemon: minute scheduler, HTTP control surface and runtime.

mod error;
pub mod config;
pub mod http;
pub mod log_rotation;
pub mod paths;
pub mod prober;
pub mod registry;
mod runtime;
pub mod schedule;
pub mod scheduler;
pub mod status_log;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, RegistryError};
pub use http::{router, AppState};
pub use prober::{HttpProber, Probe, ProbeOutcome};
pub use registry::{ProbeResult, Registry, StatusChange};
pub use runtime::{run, start_blocking};
pub use scheduler::{run_tick, Selection, TickReport};
pub use status_log::StatusLog;
