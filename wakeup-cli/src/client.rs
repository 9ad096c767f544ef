//! Blocking HTTP client for the daemon's JSON API.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Added on top of the daemon's probe timeout: add and set-url probe before
/// they respond.
const REQUEST_MARGIN: Duration = Duration::from_secs(10);

/// `explicit` seconds when given, otherwise one probe timeout plus margin.
pub fn request_timeout(explicit: Option<u64>, probe_timeout: Duration) -> Duration {
    match explicit {
        Some(secs) => Duration::from_secs(secs),
        None => probe_timeout + REQUEST_MARGIN,
    }
}

pub struct ApiClient {
    base: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call("GET", path, None)
    }

    pub fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.call("POST", path, Some(body))
    }

    pub fn put<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.call("PUT", path, Some(body))
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call("DELETE", path, None)
    }

    fn call<T: DeserializeOwned>(&self, method: &str, path: &str, body: Option<Value>) -> Result<T> {
        let url = format!("{}{path}", self.base);
        let request = self.agent.request(method, &url);
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => response
                .into_json()
                .with_context(|| format!("invalid JSON from {method} {url}")),
            Err(ureq::Error::Status(code, response)) => {
                let message = response
                    .into_json::<Value>()
                    .ok()
                    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_else(|| "no error message".to_string());
                Err(anyhow!("{method} {path} failed ({code}): {message}"))
            }
            Err(err) => Err(anyhow!(err)).with_context(|| {
                format!(
                    "could not reach wakeup daemon at {} (is `wakeup serve` running?)",
                    self.base
                )
            }),
        }
    }
}
