#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use wakeup_core::{Document, DocumentStore, Resource, ResourceStatus};
use wakeup_daemon::{Probe, ProbeOutcome, Registry};

/// Deterministic prober: `Up` unless told otherwise. Gated URLs block until
/// `release()`; URLs marked with `panic_on` panic inside the probe.
pub struct FakeProber {
    statuses: Mutex<HashMap<String, ResourceStatus>>,
    gated: Mutex<HashSet<String>>,
    panics: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    open: watch::Sender<bool>,
}

impl FakeProber {
    pub fn new() -> Arc<Self> {
        let (open, _) = watch::channel(false);
        Arc::new(Self {
            statuses: Mutex::default(),
            gated: Mutex::default(),
            panics: Mutex::default(),
            calls: Mutex::default(),
            open,
        })
    }

    pub fn set(&self, url: &str, status: ResourceStatus) {
        self.statuses.lock().unwrap().insert(url.to_string(), status);
    }

    pub fn gate(&self, url: &str) {
        self.gated.lock().unwrap().insert(url.to_string());
    }

    pub fn panic_on(&self, url: &str) {
        self.panics.lock().unwrap().insert(url.to_string());
    }

    pub fn release(&self) {
        self.open.send_replace(true);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until `url` has been probed at least once.
    pub async fn probed(&self, url: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.calls().iter().any(|c| c == url) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("probe was never started");
    }
}

#[async_trait::async_trait]
impl Probe for FakeProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.calls.lock().unwrap().push(url.to_string());
        let gated = self.gated.lock().unwrap().contains(url);
        if gated {
            let mut open = self.open.subscribe();
            let _ = open.wait_for(|open| *open).await;
        }
        if self.panics.lock().unwrap().contains(url) {
            panic!("probe exploded for {url}");
        }
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(ResourceStatus::Up);
        ProbeOutcome {
            status,
            checked_at: Utc::now(),
        }
    }
}

pub fn store_in(dir: &Path) -> DocumentStore {
    DocumentStore::new(dir.join("db.json"))
}

pub fn registry_with(dir: &Path, prober: Arc<FakeProber>, urls: &[&str]) -> Registry {
    let document = Document {
        resources: urls.iter().map(|url| Resource::new(*url)).collect(),
        ..Document::default()
    };
    Registry::with_document(document, store_in(dir), prober)
}
