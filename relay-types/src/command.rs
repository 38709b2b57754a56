//! Command and receipt payload shapes.
//!
//! These are the request/response payloads of the device command protocol.
//! Only the wire shapes live here; dispatch, timeouts, and acknowledgment
//! tracking are not part of this crate.

use serde::{Deserialize, Serialize};

use crate::MessageId;

/// Schema tag for command payloads.
pub const COMMAND_SCHEMA: &str = "state-relay.command.v1";

/// Schema tag for receipt payloads.
pub const RECEIPT_SCHEMA: &str = "state-relay.receipt.v1";

/// A directed command from one device to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPayload {
    /// Format version tag; must equal [`COMMAND_SCHEMA`].
    pub schema: String,
    /// Unique command identifier.
    pub cmd_id: String,
    /// Seconds-resolution timestamp at construction time.
    pub ts: u64,
    /// Sender's public identity.
    pub from: String,
    /// Target device's public identity.
    pub to: String,
    /// Namespace the command addresses.
    pub namespace: String,
    /// Action name understood by the target.
    pub action: String,
    /// Action parameters, structure unconstrained.
    pub params: serde_json::Value,
    /// Seconds until the command expires.
    pub ttl: u32,
    /// Whether the sender expects receipt messages back.
    pub expect_receipt: bool,
}

/// Lifecycle status of a command, reported in receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    /// Command was received by the target.
    Received,
    /// Execution has started.
    Started,
    /// Execution finished successfully.
    Completed,
    /// Execution failed.
    Failed,
}

/// Reference to a published snapshot, attached to completion receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRef {
    /// Wire kind of the referenced message.
    pub kind: u32,
    /// Addressable key of the referenced stream.
    pub d: String,
    /// Revision of the referenced snapshot.
    pub rev: u64,
    /// Transport id of the referenced message, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
}

/// A receipt reporting command progress back to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptPayload {
    /// Format version tag; must equal [`RECEIPT_SCHEMA`].
    pub schema: String,
    /// The command this receipt refers to.
    pub cmd_id: String,
    /// Lifecycle status.
    pub status: ReceiptStatus,
    /// Seconds-resolution timestamp at construction time.
    pub ts: u64,
    /// Optional result data for completed commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Optional reference to state produced by the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_ref: Option<StateRef>,
}
