//! Transport message wrappers.
//!
//! A [`MessageTemplate`] is the unsigned form handed to the identity
//! provider; signing assigns the final id and authentication proof,
//! producing a [`SignedMessage`] ready to publish.

use serde::{Deserialize, Serialize};

use crate::{MessageId, TagSet};

/// Wire kind number for snapshot messages.
pub const SNAPSHOT_KIND: u32 = 30333;

/// Wire kind number for receipt messages (payload shape only; no dispatch).
pub const RECEIPT_KIND: u32 = 30334;

/// An unsigned message: everything but the transport identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Wire message kind.
    pub kind: u32,
    /// Creation time (seconds).
    pub created_at: u64,
    /// Addressing and filtering tags.
    pub tags: TagSet,
    /// Encrypted serialized payload.
    pub content: String,
}

/// A signed, publishable transport message.
///
/// The content is encrypted and opaque to the transport; the tags carry
/// everything needed for addressing and cheap winner selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    /// Identifier assigned by the identity provider at signing time.
    pub id: MessageId,
    /// Author's public identity.
    pub pubkey: String,
    /// Wire message kind.
    pub kind: u32,
    /// Transport-assigned creation time (seconds).
    pub created_at: u64,
    /// Addressing and filtering tags.
    pub tags: TagSet,
    /// Encrypted serialized payload.
    pub content: String,
    /// Authentication proof over the message.
    pub sig: String,
}
