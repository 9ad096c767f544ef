//! Single bounded-time reachability check.

use std::time::Duration;

use chrono::{DateTime, Utc};

use wakeup_core::ResourceStatus;

use crate::error::DaemonError;

pub const USER_AGENT: &str = "WakeUp Health Check";

/// Result of one probe. `status` is never `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: ResourceStatus,
    pub checked_at: DateTime<Utc>,
}

/// Checks one URL. Implementations must not fail: every error is a `Down`.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// GET-based prober. 2xx and 3xx are `Up`; any other status, transport error
/// or timeout is `Down`.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, DaemonError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let status = match self.client.get(url).send().await {
            Ok(response) => {
                let code = response.status();
                if code.is_success() || code.is_redirection() {
                    ResourceStatus::Up
                } else {
                    tracing::debug!(url, status = code.as_u16(), "probe got failing status");
                    ResourceStatus::Down
                }
            }
            Err(err) => {
                tracing::debug!(url, error = %err, timeout = err.is_timeout(), "probe failed");
                ResourceStatus::Down
            }
        };
        ProbeOutcome {
            status,
            checked_at: Utc::now(),
        }
    }
}
