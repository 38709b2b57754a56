//! Identity and addressing types for state-relay.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a publishing application instance.
///
/// Device ids are opaque strings chosen by the application. They are used
/// only as the final tie-breaker in conflict resolution (lexicographic
/// minimum wins), never for authorization.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a DeviceId from an application-chosen string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a random DeviceId (`dev-` plus 8 random bytes, hex-encoded).
    pub fn random() -> Self {
        let mut bytes = [0u8; 8];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(format!("dev-{}", hex::encode(bytes)))
    }

    /// Get the string form of this DeviceId.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

/// A unique identifier for a snapshot instance.
///
/// Freshly generated for every built payload (per instance, not per
/// revision). UUID v4 format, serialized as the hyphenated string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(uuid::Uuid);

impl StateId {
    /// Create a new random StateId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create a StateId from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({})", self.0)
    }
}

/// A transport-assigned message identifier.
///
/// Assigned by the identity provider when a message template is signed;
/// opaque to this crate.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a MessageId from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string form of this MessageId.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

/// The addressable key identifying one logical state stream.
///
/// Formed as `app:namespace`; carried in the `d` tag of every snapshot
/// message so the transport can filter without decryption.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamKey(String);

impl StreamKey {
    /// Build the key for an app/namespace pair.
    pub fn new(app: &str, namespace: &str) -> Self {
        Self(format!("{app}:{namespace}"))
    }

    /// Get the string form of this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamKey({})", self.0)
    }
}

/// The publishing context: which stream this instance writes to, and as whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    /// Application name.
    pub app: String,
    /// Namespace within the application.
    pub namespace: String,
    /// This instance's device identity.
    pub device_id: DeviceId,
}

impl AppContext {
    /// Create a new context.
    pub fn new(app: impl Into<String>, namespace: impl Into<String>, device_id: DeviceId) -> Self {
        Self {
            app: app.into(),
            namespace: namespace.into(),
            device_id,
        }
    }

    /// The addressable key for this context's stream.
    pub fn stream_key(&self) -> StreamKey {
        StreamKey::new(&self.app, &self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_ordering_is_lexicographic() {
        let a = DeviceId::new("DEV_a");
        let b = DeviceId::new("DEV_b");
        assert!(a < b);
    }

    #[test]
    fn device_id_random_has_prefix() {
        let id = DeviceId::random();
        assert!(id.as_str().starts_with("dev-"));
        assert_eq!(id.as_str().len(), 4 + 16); // "dev-" + 8 bytes hex
    }

    #[test]
    fn state_id_is_uuid_v4() {
        let id = StateId::new();
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn state_id_serializes_as_string() {
        let id = StateId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn state_ids_are_unique() {
        assert_ne!(StateId::new(), StateId::new());
    }

    #[test]
    fn stream_key_joins_app_and_namespace() {
        let key = StreamKey::new("drill-app", "default");
        assert_eq!(key.as_str(), "drill-app:default");
    }

    #[test]
    fn app_context_stream_key() {
        let ctx = AppContext::new("test-app", "default", DeviceId::new("DEV_test"));
        assert_eq!(ctx.stream_key().as_str(), "test-app:default");
    }

    #[test]
    fn message_id_display_roundtrip() {
        let id = MessageId::new("msg-123");
        assert_eq!(id.to_string(), "msg-123");
        assert_eq!(id.as_str(), "msg-123");
    }
}
