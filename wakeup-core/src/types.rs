//! Domain types for the WakeUp document.
//!
//! Field names serialize in camelCase so the on-disk document and the HTTP
//! payloads share one shape. Timestamps are RFC 3339 UTC.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidInterval;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a monitored resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Minutes between scheduled probes, always within
/// [`PingInterval::MIN`]`..=`[`PingInterval::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct PingInterval(u32);

impl PingInterval {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 60;
    pub const DEFAULT: PingInterval = PingInterval(5);

    pub fn new(minutes: i64) -> Result<Self, InvalidInterval> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&minutes) {
            Ok(Self(minutes as u32))
        } else {
            Err(InvalidInterval(minutes))
        }
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl Default for PingInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for PingInterval {
    type Error = InvalidInterval;

    fn try_from(minutes: i64) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<PingInterval> for u32 {
    fn from(interval: PingInterval) -> Self {
        interval.0
    }
}

impl fmt::Display for PingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Last observed reachability of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Unknown,
    Up,
    Down,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceStatus::Unknown => write!(f, "unknown"),
            ResourceStatus::Up => write!(f, "up"),
            ResourceStatus::Down => write!(f, "down"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A monitored endpoint and its last known health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub url: String,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Per-resource override of [`Settings::ping_interval`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_interval: Option<PingInterval>,
}

impl Resource {
    /// A never-probed resource for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: ResourceId::generate(),
            url: url.into(),
            status: ResourceStatus::Unknown,
            last_checked: None,
            created_at: Utc::now(),
            ping_interval: None,
        }
    }

    /// The override if present, otherwise the global interval.
    pub fn effective_interval(&self, settings: &Settings) -> PingInterval {
        self.ping_interval.unwrap_or(settings.ping_interval)
    }

    /// Apply a completed probe. `status` and `last_checked` always move together.
    ///
    /// Returns `true` when the status changed or this was the first check.
    pub fn record_probe(&mut self, status: ResourceStatus, checked_at: DateTime<Utc>) -> bool {
        let changed = self.status != status || self.last_checked.is_none();
        self.status = status;
        self.last_checked = Some(checked_at);
        changed
    }

    /// Back to the never-probed state (used after a URL change).
    pub fn reset_status(&mut self) {
        self.status = ResourceStatus::Unknown;
        self.last_checked = None;
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub ping_interval: PingInterval,
}

/// Root of the persisted state.
///
/// Documents written under the older `uris` key are accepted on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default, alias = "uris")]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub settings: Settings,
}

impl Document {
    pub fn find(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    pub fn find_mut(&mut self, id: &ResourceId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| &r.id == id)
    }

    pub fn position(&self, id: &ResourceId) -> Option<usize> {
        self.resources.iter().position(|r| &r.id == id)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.resources.iter().any(|r| r.url == url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bounds() {
        assert!(PingInterval::new(1).is_ok());
        assert!(PingInterval::new(60).is_ok());
        assert_eq!(PingInterval::new(0), Err(InvalidInterval(0)));
        assert_eq!(PingInterval::new(61), Err(InvalidInterval(61)));
        assert_eq!(PingInterval::new(-5), Err(InvalidInterval(-5)));
        assert_eq!(PingInterval::default().minutes(), 5);
    }

    #[test]
    fn interval_rejected_on_deserialize() {
        let err = serde_json::from_str::<Settings>(r#"{"pingInterval":0}"#).unwrap_err();
        assert!(err.to_string().contains("invalid ping interval"));
    }

    #[test]
    fn resource_serializes_camel_case() {
        let resource = Resource::new("https://example.com");
        let json = serde_json::to_value(&resource).expect("serialize");
        assert_eq!(json["status"], "unknown");
        assert!(json["lastChecked"].is_null());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("pingInterval").is_none(), "absent override is omitted");
    }

    #[test]
    fn record_probe_pairs_status_and_timestamp() {
        let mut resource = Resource::new("https://example.com");
        let now = Utc::now();
        assert!(resource.record_probe(ResourceStatus::Up, now), "first check counts as change");
        assert_eq!(resource.last_checked, Some(now));

        let later = now + chrono::Duration::seconds(60);
        assert!(!resource.record_probe(ResourceStatus::Up, later));
        assert_eq!(resource.last_checked, Some(later), "timestamp refreshes on every probe");

        assert!(resource.record_probe(ResourceStatus::Down, later));
    }

    #[test]
    fn effective_interval_prefers_override() {
        let settings = Settings::default();
        let mut resource = Resource::new("https://example.com");
        assert_eq!(resource.effective_interval(&settings).minutes(), 5);
        resource.ping_interval = Some(PingInterval::new(1).unwrap());
        assert_eq!(resource.effective_interval(&settings).minutes(), 1);
    }

    #[test]
    fn legacy_uris_key_loads() {
        let json = r#"{"uris":[{"id":"abc123","url":"https://a.test","status":"up",
            "lastChecked":null,"createdAt":"2024-01-01T00:00:00Z"}]}"#;
        let doc: Document = serde_json::from_str(json).expect("deserialize");
        assert_eq!(doc.resources.len(), 1);
        assert_eq!(doc.resources[0].id, ResourceId::from("abc123"));
        assert_eq!(doc.settings, Settings::default(), "missing settings are defaulted");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(ResourceId::generate(), ResourceId::generate());
    }
}
