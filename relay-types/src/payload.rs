//! Snapshot payload - the versioned unit of synchronized state.

use serde::{Deserialize, Serialize};

use crate::{DeviceId, MessageId, RelayError, StateId};

/// Schema tag identifying the snapshot payload format version.
pub const SNAPSHOT_SCHEMA: &str = "state-relay.snapshot.v1";

/// Coarse health indicator carried in every snapshot summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    /// Everything nominal.
    Green,
    /// Degraded but operational.
    Yellow,
    /// Something is wrong.
    Red,
}

/// Small fixed-shape health summary.
///
/// Cheap to inspect once decoded; travels inside the encrypted body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Health indicator.
    pub health: Health,
    /// Optional free-text note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Summary {
    /// A green summary with no notes, the default for fresh snapshots.
    pub fn green() -> Self {
        Self {
            health: Health::Green,
            notes: None,
        }
    }
}

/// Wrapper for the caller-supplied state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotData {
    /// Arbitrary application state; structure is not constrained.
    pub payload: serde_json::Value,
}

/// A complete versioned representation of application state.
///
/// This is the logical document that gets encoded, encrypted, and published.
/// `rev` is the primary ordering key; `prev` forms an optional causal chain
/// that is informational only and never consulted by conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// Format version tag; must equal [`SNAPSHOT_SCHEMA`].
    pub schema: String,
    /// Application name.
    pub app: String,
    /// Namespace within the application.
    pub namespace: String,
    /// Identity of the publishing instance.
    pub device_id: DeviceId,
    /// Fresh unique id for this snapshot instance.
    pub state_id: StateId,
    /// Revision counter; the primary ordering key.
    pub rev: u64,
    /// Optional reference to a prior snapshot's state id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<StateId>,
    /// Seconds-resolution wall-clock timestamp at construction time.
    pub ts: u64,
    /// Health summary.
    pub summary: Summary,
    /// The synchronized state itself.
    pub data: SnapshotData,
}

impl SnapshotPayload {
    /// Serialize to the canonical JSON text form.
    pub fn to_json(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(RelayError::Serialization)
    }

    /// Deserialize from JSON text.
    pub fn from_json(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text).map_err(RelayError::InvalidPayload)
    }
}

/// Parsed view of a snapshot message, returned to callers.
///
/// Created by parse and handed straight to the caller; the core retains
/// nothing beyond the synchronizer's own last-published bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResult {
    /// The decoded payload.
    pub payload: SnapshotPayload,
    /// Revision, extracted from the payload.
    pub rev: u64,
    /// Transport message identifier.
    pub message_id: MessageId,
    /// Transport-assigned creation time (seconds).
    pub created_at: u64,
}
