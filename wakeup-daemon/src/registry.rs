//! Resource registry: the single owner of the in-memory document.
//!
//! Every read-modify-write happens under one async mutex. Probes never run
//! while it is held; their results are merged back by id and applied only if
//! the resource still exists with the URL that was probed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use wakeup_core::{
    is_valid_url, Document, DocumentStore, PingInterval, Resource, ResourceId, ResourceStatus,
    Settings, StoreError,
};

use crate::error::RegistryError;
use crate::prober::{Probe, ProbeOutcome};
use crate::status_log::StatusLog;

const EVENT_CAPACITY: usize = 256;

/// Published whenever a probe changes a resource's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub id: ResourceId,
    pub url: String,
    pub status: ResourceStatus,
    pub checked_at: DateTime<Utc>,
}

/// A probe result tagged with the resource it was taken for.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub id: ResourceId,
    pub url: String,
    pub outcome: ProbeOutcome,
}

pub struct Registry {
    document: Mutex<Document>,
    store: DocumentStore,
    prober: Arc<dyn Probe>,
    status_log: Option<StatusLog>,
    events: broadcast::Sender<StatusChange>,
}

impl Registry {
    /// Load (or bootstrap) the document from `store`.
    pub fn open(store: DocumentStore, prober: Arc<dyn Probe>) -> Self {
        let document = store.load();
        Self::with_document(document, store, prober)
    }

    pub fn with_document(document: Document, store: DocumentStore, prober: Arc<dyn Probe>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            document: Mutex::new(document),
            store,
            prober,
            status_log: None,
            events,
        }
    }

    /// Append every status transition to `log`.
    pub fn with_status_log(mut self, log: StatusLog) -> Self {
        self.status_log = Some(log);
        self
    }

    pub fn prober(&self) -> Arc<dyn Probe> {
        Arc::clone(&self.prober)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.events.subscribe()
    }

    /// Owned copy of the current document.
    pub async fn snapshot(&self) -> Document {
        self.document.lock().await.clone()
    }

    pub async fn list_resources(&self) -> Vec<Resource> {
        self.document.lock().await.resources.clone()
    }

    pub async fn get_settings(&self) -> Settings {
        self.document.lock().await.settings
    }

    /// Validate, append and persist a new resource, then probe it once and
    /// return the probed state.
    pub async fn add_resource(&self, url: &str) -> Result<Resource, RegistryError> {
        if !is_valid_url(url) {
            return Err(RegistryError::InvalidUrl(url.to_string()));
        }

        let resource = {
            let mut doc = self.document.lock().await;
            if doc.contains_url(url) {
                return Err(RegistryError::Duplicate(url.to_string()));
            }
            let resource = Resource::new(url);
            doc.resources.push(resource.clone());
            self.persist(&doc).await?;
            resource
        };
        tracing::info!(id = %resource.id, url, "resource added");

        self.probe_now(resource).await
    }

    pub async fn delete_resource(&self, id: &ResourceId) -> Result<(), RegistryError> {
        let mut doc = self.document.lock().await;
        let index = doc
            .position(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        let removed = doc.resources.remove(index);
        self.persist(&doc).await?;
        tracing::info!(id = %id, url = %removed.url, "resource deleted");
        Ok(())
    }

    /// Replace a resource's URL, reset its status and probe it again.
    pub async fn update_resource_url(
        &self,
        id: &ResourceId,
        url: &str,
    ) -> Result<Resource, RegistryError> {
        if !is_valid_url(url) {
            return Err(RegistryError::InvalidUrl(url.to_string()));
        }

        let resource = {
            let mut doc = self.document.lock().await;
            if doc.find(id).is_none() {
                return Err(RegistryError::NotFound(id.clone()));
            }
            if doc.resources.iter().any(|r| r.url == url && &r.id != id) {
                return Err(RegistryError::Duplicate(url.to_string()));
            }
            let resource = doc
                .find_mut(id)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            resource.url = url.to_string();
            resource.reset_status();
            let resource = resource.clone();
            self.persist(&doc).await?;
            resource
        };
        tracing::info!(id = %id, url, "resource URL updated");

        self.probe_now(resource).await
    }

    pub async fn update_settings(&self, ping_interval: i64) -> Result<Settings, RegistryError> {
        let ping_interval = PingInterval::new(ping_interval)?;
        let mut doc = self.document.lock().await;
        doc.settings.ping_interval = ping_interval;
        let settings = doc.settings;
        self.persist(&doc).await?;
        tracing::info!(interval = %ping_interval, "global ping interval updated");
        Ok(settings)
    }

    /// Set (`Some`) or clear (`None`) a resource's interval override.
    pub async fn set_resource_interval(
        &self,
        id: &ResourceId,
        ping_interval: Option<i64>,
    ) -> Result<Resource, RegistryError> {
        let mut doc = self.document.lock().await;
        let resource = doc
            .find_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        let ping_interval = ping_interval.map(PingInterval::new).transpose()?;
        resource.ping_interval = ping_interval;
        let resource = resource.clone();
        self.persist(&doc).await?;
        match ping_interval {
            Some(interval) => tracing::info!(id = %id, %interval, "resource interval set"),
            None => tracing::info!(id = %id, "resource interval cleared"),
        }
        Ok(resource)
    }

    /// Merge probe results into the current document. Results for resources
    /// that were deleted, or whose URL changed since the probe started, are
    /// dropped. Persists once, and only when something changed.
    ///
    /// Returns the number of resources whose state changed.
    pub async fn apply_results(&self, results: Vec<ProbeResult>) -> Result<usize, StoreError> {
        let mut doc = self.document.lock().await;
        let mut changes = Vec::new();

        for result in results {
            let Some(resource) = doc.find_mut(&result.id) else {
                tracing::debug!(id = %result.id, "dropping result for deleted resource");
                continue;
            };
            if resource.url != result.url {
                tracing::debug!(id = %result.id, "dropping result for superseded URL");
                continue;
            }
            if resource.record_probe(result.outcome.status, result.outcome.checked_at) {
                changes.push(StatusChange {
                    id: resource.id.clone(),
                    url: resource.url.clone(),
                    status: resource.status,
                    checked_at: result.outcome.checked_at,
                });
            }
        }

        let saved = if changes.is_empty() {
            Ok(())
        } else {
            self.persist(&doc).await
        };
        drop(doc);

        for change in &changes {
            self.announce(change).await;
        }
        saved.map(|()| changes.len())
    }

    async fn probe_now(&self, resource: Resource) -> Result<Resource, RegistryError> {
        let outcome = self.prober.probe(&resource.url).await;
        self.apply_results(vec![ProbeResult {
            id: resource.id.clone(),
            url: resource.url.clone(),
            outcome,
        }])
        .await?;

        let current = self.document.lock().await.find(&resource.id).cloned();
        Ok(match current {
            Some(current) => current,
            // deleted while the probe was in flight
            None => {
                let mut detached = resource;
                detached.record_probe(outcome.status, outcome.checked_at);
                detached
            }
        })
    }

    async fn announce(&self, change: &StatusChange) {
        let label = change.status.to_string().to_uppercase();
        tracing::info!(id = %change.id, "{} is {label}", change.url);
        if let Some(log) = self.status_log.clone() {
            let (url, status, at) = (change.url.clone(), change.status, change.checked_at);
            let path = log.path().to_path_buf();
            match tokio::task::spawn_blocking(move || log.record(&url, status, at)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(path = %path.display(), error = %err, "failed to append status log");
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "status log writer join error");
                }
            }
        }
        // no receivers is fine
        let _ = self.events.send(change.clone());
    }

    /// Save `doc` off the async workers. Callers keep the document guard
    /// across this await so saves land in lock order.
    async fn persist(&self, doc: &Document) -> Result<(), StoreError> {
        let store = self.store.clone();
        let snapshot = doc.clone();
        let saved = tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .unwrap_or_else(|err| {
                Err(StoreError::Io {
                    path: self.store.path().to_path_buf(),
                    source: std::io::Error::other(err),
                })
            });
        saved.inspect_err(|err| {
            tracing::error!(path = %self.store.path().display(), error = %err, "failed to persist document");
        })
    }
}
