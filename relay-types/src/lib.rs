//! # relay-types
//!
//! Wire format types for the state-relay snapshot sync protocol.
//!
//! This crate provides the foundational types used across all state-relay
//! crates:
//! - [`DeviceId`], [`StateId`], [`MessageId`], [`StreamKey`] - Identity and addressing types
//! - [`SnapshotPayload`] - The versioned unit of synchronized state
//! - [`TagSet`] - Message tags for addressing without decryption
//! - [`MessageTemplate`] / [`SignedMessage`] - Transport message wrappers
//! - [`CommandPayload`] / [`ReceiptPayload`] - Command protocol payload shapes
//! - [`RelayError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod error;
mod ids;
mod message;
mod payload;
mod tags;

pub use command::{
    CommandPayload, ReceiptPayload, ReceiptStatus, StateRef, COMMAND_SCHEMA, RECEIPT_SCHEMA,
};
pub use error::RelayError;
pub use ids::{AppContext, DeviceId, MessageId, StateId, StreamKey};
pub use message::{MessageTemplate, SignedMessage, RECEIPT_KIND, SNAPSHOT_KIND};
pub use payload::{
    Health, SnapshotData, SnapshotPayload, SnapshotResult, Summary, SNAPSHOT_SCHEMA,
};
pub use tags::{TagSet, TAG_VERSION};
