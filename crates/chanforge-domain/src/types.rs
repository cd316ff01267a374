use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const EVENT_TYPE_MEDIA_UPLOADED: &str = "media.uploaded";

// ── Enums ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Reel,
    Series,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Reel => write!(f, "reel"),
            ContentType::Series => write!(f, "series"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Provisioning,
    Ready,
    Failed,
    Retired,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStatus::Provisioning => write!(f, "provisioning"),
            ChannelStatus::Ready => write!(f, "ready"),
            ChannelStatus::Failed => write!(f, "failed"),
            ChannelStatus::Retired => write!(f, "retired"),
        }
    }
}

/// `channelId` and `originEndpoint` start life as the sentinel string
/// `"pending"` and are assigned once the engine responds. Encoding the
/// sentinel as a sum type means a `ChannelMetadata` cannot be constructed in
/// `Ready` status without a real value in hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignable {
    Pending,
    Assigned(String),
}

impl Assignable {
    pub fn pending() -> Self {
        Assignable::Pending
    }

    pub fn assigned(value: impl Into<String>) -> Self {
        Assignable::Assigned(value.into())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Assignable::Pending)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Assignable::Pending => "pending",
            Assignable::Assigned(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Assignable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Wire representation is the bare sentinel string or the assigned value;
// external consumers never observe the tagged-enum shape.
impl Serialize for Assignable {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Assignable {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(if s == "pending" {
            Assignable::Pending
        } else {
            Assignable::Assigned(s)
        })
    }
}

// ── Event payload types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drm {
    pub key_id: String,
    pub license_server: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoRestrictions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEventPayload {
    pub content_id: String,
    pub tenant_id: String,
    pub content_type: ContentType,
    pub source_uri: String,
    pub checksum: String,
    pub duration_seconds: u64,
    pub ingest_region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drm: Option<Drm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_window: Option<AvailabilityWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_restrictions: Option<GeoRestrictions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgement: Option<serde_json::Value>,
}

/// Envelope carried on the pub/sub message. Unknown top-level fields are
/// ignored by serde's default struct deserialization (no `deny_unknown_fields`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCompletedEvent {
    pub event_id: String,
    pub event_type: String,
    pub version: u32,
    pub occurred_at: DateTime<Utc>,
    pub data: UploadEventPayload,
}

impl UploadCompletedEvent {
    /// Parses a decoded JSON payload, rejecting any `eventType` other than
    /// the fixed constant.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DomainError> {
        let event: UploadCompletedEvent = serde_json::from_slice(bytes)
            .map_err(|e| DomainError::InvalidContentId(e.to_string()))?;
        if event.event_type != EVENT_TYPE_MEDIA_UPLOADED {
            return Err(DomainError::UnsupportedEventType {
                expected: EVENT_TYPE_MEDIA_UPLOADED,
                actual: event.event_type,
            });
        }
        Ok(event)
    }
}

// ── ABR ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbrVariant {
    pub name: String,
    pub resolution: String,
    pub bitrate_kbps: u32,
}

// ── Provisioning request/result ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProvisioningRequest {
    pub content_id: String,
    pub classification: ContentType,
    pub source_uri: String,
    pub ingest_pool: String,
    pub egress_pool: String,
    pub abr_ladder: Vec<AbrVariant>,
    pub output_bucket: String,
    pub manifest_path: String,
    pub cache_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drm: Option<Drm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_window: Option<AvailabilityWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_restrictions: Option<GeoRestrictions>,
    /// Opaque annotations forwarded to the engine; insertion order is
    /// irrelevant so a `BTreeMap` gives deterministic iteration for logging
    /// and tests without needing one.
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProvisioningResult {
    pub channel_id: String,
    /// Overrides the derived manifest path when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,
    pub origin_endpoint: String,
    /// Overrides `cdnBaseUrl` resolution when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_base_url: Option<String>,
    pub profile_hash: String,
}

// ── Persistent record ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetadata {
    pub content_id: String,
    pub channel_id: Assignable,
    pub classification: ContentType,
    pub manifest_path: String,
    pub playback_url: String,
    pub origin_endpoint: Assignable,
    pub cache_key: String,
    pub checksum: String,
    pub status: ChannelStatus,
    pub retries: u32,
    pub source_asset_uri: String,
    pub last_provisioned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drm: Option<Drm>,
    pub ingest_region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_window: Option<AvailabilityWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_restrictions: Option<GeoRestrictions>,
}

impl ChannelMetadata {
    /// `status=ready` implies both sentinel fields are assigned. Checked here
    /// rather than only at the type level, since `Assignable` alone can't
    /// prevent constructing a `Ready` record by hand with `Pending` inside.
    pub fn check_ready_invariant(&self) -> Result<(), DomainError> {
        if self.status == ChannelStatus::Ready
            && (self.channel_id.is_pending() || self.origin_endpoint.is_pending())
        {
            return Err(DomainError::ReadyWithoutAssignment);
        }
        Ok(())
    }
}
