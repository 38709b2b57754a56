//! Error types for state-relay.

use thiserror::Error;

/// Errors raised while building or parsing snapshot payloads.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The serialized payload exceeds the configured maximum size.
    ///
    /// Raised before any crypto or network call; fully recoverable by
    /// publishing a smaller payload.
    #[error("snapshot exceeds max size: {actual} > {max} bytes")]
    SnapshotTooLarge {
        /// Byte length of the encoded payload.
        actual: usize,
        /// Configured maximum in bytes.
        max: usize,
    },

    /// Payload serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Decrypted content is not a well-formed payload.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// Well-formed payload with an unrecognized schema tag.
    #[error("unsupported snapshot schema: {0}")]
    UnsupportedSchema(String),
}
