//! The tag set carried by every snapshot message.
//!
//! Tags let the transport address and filter messages without decrypting
//! them. A snapshot message carries six required tags: `d` (the addressable
//! key), `app`, `ns`, `rev` (decimal), `device`, and `ver`.

use serde::{Deserialize, Serialize};

use crate::{DeviceId, StreamKey};

/// Tag-format version carried in the `ver` tag.
pub const TAG_VERSION: &str = "1";

/// An ordered set of key/value tag pairs.
///
/// Serialized as an array of two-element arrays, the form transports expect.
/// Construction via [`TagSet::for_snapshot`] always produces the complete
/// required set; messages received from the transport may carry fewer tags,
/// so the readers are lenient — a missing key yields `None` and the caller
/// decides how to degrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TagSet {
    pairs: Vec<(String, String)>,
}

impl TagSet {
    /// Build the six required tags for a snapshot message.
    pub fn for_snapshot(key: &StreamKey, app: &str, namespace: &str, rev: u64, device: &DeviceId) -> Self {
        Self {
            pairs: vec![
                ("d".into(), key.as_str().into()),
                ("app".into(), app.into()),
                ("ns".into(), namespace.into()),
                ("rev".into(), rev.to_string()),
                ("device".into(), device.as_str().into()),
                ("ver".into(), TAG_VERSION.into()),
            ],
        }
    }

    /// Wrap raw pairs as received from the transport. No validation.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Look up the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `d` tag: the addressable key.
    pub fn stream(&self) -> Option<&str> {
        self.get("d")
    }

    /// The `app` tag.
    pub fn app(&self) -> Option<&str> {
        self.get("app")
    }

    /// The `ns` tag.
    pub fn namespace(&self) -> Option<&str> {
        self.get("ns")
    }

    /// The `rev` tag, parsed from its decimal form.
    ///
    /// `None` when absent or unparseable; callers selecting a winner treat
    /// that as revision 0 so malformed messages lose, not error.
    pub fn rev(&self) -> Option<u64> {
        self.get("rev").and_then(|v| v.parse().ok())
    }

    /// The `device` tag.
    pub fn device(&self) -> Option<&str> {
        self.get("device")
    }

    /// The `ver` tag.
    pub fn version(&self) -> Option<&str> {
        self.get("ver")
    }

    /// Whether all six required snapshot tags are present.
    pub fn is_complete(&self) -> bool {
        ["d", "app", "ns", "rev", "device", "ver"]
            .iter()
            .all(|k| self.get(k).is_some())
    }

    /// The raw pairs, in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
