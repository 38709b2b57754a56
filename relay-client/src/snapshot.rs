//! Snapshot codec - translation between application data and transport
//! messages.
//!
//! Stateless per call: building a message touches no local state beyond
//! the two identity-provider calls (encrypt, sign), and the size limit is
//! enforced before either happens.

use std::sync::Arc;
use thiserror::Error;

use relay_core::{Clock, StateIdSource};
use relay_types::{
    AppContext, MessageTemplate, RelayError, SignedMessage, SnapshotPayload, SnapshotResult,
    StateId, TagSet, SNAPSHOT_KIND, SNAPSHOT_SCHEMA,
};

use crate::identity::{Identity, IdentityError};

/// Codec errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Payload construction or validation failed.
    #[error(transparent)]
    Payload(#[from] RelayError),

    /// The identity provider failed.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Builds and parses snapshot messages for one stream.
///
/// Payloads are self-encrypted: addressed to the publisher's own public
/// identity, on the assumption that every device in the stream shares the
/// same key material and the transport provides no confidentiality.
pub struct SnapshotCodec {
    ctx: AppContext,
    max_snapshot_bytes: usize,
    identity: Arc<dyn Identity>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn StateIdSource>,
}

impl SnapshotCodec {
    /// Create a codec with the given collaborators.
    pub fn new(
        ctx: AppContext,
        max_snapshot_bytes: usize,
        identity: Arc<dyn Identity>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn StateIdSource>,
    ) -> Self {
        Self {
            ctx,
            max_snapshot_bytes,
            identity,
            clock,
            ids,
        }
    }

    /// Build a snapshot payload for `data` at revision `rev`.
    pub fn build_payload(
        &self,
        data: serde_json::Value,
        rev: u64,
        prev: Option<StateId>,
    ) -> SnapshotPayload {
        relay_core::build_payload(&self.ctx, data, rev, prev, &*self.clock, &*self.ids)
    }

    /// Build a signed, encrypted transport message for `data` at `rev`.
    ///
    /// Fails with [`RelayError::SnapshotTooLarge`] before any identity call
    /// when the encoded payload exceeds the configured maximum.
    pub async fn build_message(
        &self,
        data: serde_json::Value,
        rev: u64,
        prev: Option<StateId>,
    ) -> Result<SignedMessage, SnapshotError> {
        let payload = self.build_payload(data, rev, prev);
        let plaintext = relay_core::encode_payload(&payload, self.max_snapshot_bytes)?;

        let encrypted = self
            .identity
            .encrypt(&plaintext, self.identity.public_key())
            .await?;

        let template = MessageTemplate {
            kind: SNAPSHOT_KIND,
            created_at: self.clock.now_unix(),
            tags: TagSet::for_snapshot(
                &self.ctx.stream_key(),
                &self.ctx.app,
                &self.ctx.namespace,
                rev,
                &self.ctx.device_id,
            ),
            content: encrypted,
        };

        Ok(self.identity.sign(template).await?)
    }

    /// Decrypt and parse a snapshot message.
    ///
    /// A malformed message fails on its own; nothing else is affected.
    /// The result reports the decrypted payload's `rev`; the message tags
    /// are not cross-checked against it.
    pub async fn parse_message(&self, message: &SignedMessage) -> Result<SnapshotResult, SnapshotError> {
        let plaintext = self
            .identity
            .decrypt(&message.content, self.identity.public_key())
            .await?;

        let payload = SnapshotPayload::from_json(&plaintext)?;
        if payload.schema != SNAPSHOT_SCHEMA {
            return Err(RelayError::UnsupportedSchema(payload.schema).into());
        }

        Ok(SnapshotResult {
            rev: payload.rev,
            message_id: message.id.clone(),
            created_at: message.created_at,
            payload,
        })
    }
}

impl std::fmt::Debug for SnapshotCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCodec")
            .field("ctx", &self.ctx)
            .field("max_snapshot_bytes", &self.max_snapshot_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MockIdentity;
    use relay_core::{RandomIds, SystemClock};
    use relay_types::DeviceId;
    use serde_json::json;

    fn codec_with(identity: Arc<MockIdentity>) -> SnapshotCodec {
        SnapshotCodec::new(
            AppContext::new("test-app", "default", DeviceId::new("DEV_test")),
            65536,
            identity,
            Arc::new(SystemClock),
            Arc::new(RandomIds),
        )
    }

    #[tokio::test]
    async fn build_message_carries_all_six_tags() {
        let codec = codec_with(Arc::new(MockIdentity::default()));
        let message = codec.build_message(json!({"foo": "bar"}), 1, None).await.unwrap();

        assert_eq!(message.kind, SNAPSHOT_KIND);
        assert!(message.tags.is_complete());
        assert_eq!(message.tags.stream(), Some("test-app:default"));
        assert_eq!(message.tags.app(), Some("test-app"));
        assert_eq!(message.tags.namespace(), Some("default"));
        assert_eq!(message.tags.rev(), Some(1));
        assert_eq!(message.tags.device(), Some("DEV_test"));
        assert_eq!(message.tags.version(), Some("1"));
    }

    #[tokio::test]
    async fn content_is_encrypted_and_signed() {
        let identity = Arc::new(MockIdentity::default());
        let codec = codec_with(identity.clone());
        let message = codec.build_message(json!({"foo": "bar"}), 1, None).await.unwrap();

        assert!(message.content.starts_with("enc:"));
        assert!(!message.content.contains("foo"));
        let calls = identity.calls();
        assert_eq!(calls.encrypt, 1);
        assert_eq!(calls.sign, 1);
    }

    #[tokio::test]
    async fn round_trip_recovers_rev_and_data() {
        let codec = codec_with(Arc::new(MockIdentity::default()));
        let data = json!({"foo": "bar", "nested": {"n": 3}});
        let message = codec.build_message(data.clone(), 7, None).await.unwrap();

        let result = codec.parse_message(&message).await.unwrap();
        assert_eq!(result.rev, 7);
        assert_eq!(result.payload.rev, 7);
        assert_eq!(result.payload.data.payload, data);
        assert_eq!(result.message_id, message.id);
        assert_eq!(result.created_at, message.created_at);
    }

    #[tokio::test]
    async fn oversized_payload_fails_before_any_identity_call() {
        let identity = Arc::new(MockIdentity::default());
        let codec = codec_with(identity.clone());

        let huge = json!({ "data": "x".repeat(70000) });
        let err = codec.build_message(huge, 1, None).await.unwrap_err();

        match err {
            SnapshotError::Payload(RelayError::SnapshotTooLarge { actual, max }) => {
                assert!(actual > 65536);
                assert_eq!(max, 65536);
            }
            other => panic!("expected SnapshotTooLarge, got {other:?}"),
        }

        let calls = identity.calls();
        assert_eq!(calls.encrypt, 0);
        assert_eq!(calls.sign, 0);
    }

    #[tokio::test]
    async fn parse_rejects_unsupported_schema_naming_it() {
        let codec = codec_with(Arc::new(MockIdentity::default()));
        let mut message = codec.build_message(json!({}), 1, None).await.unwrap();

        // Re-encrypt a payload with a future schema tag.
        let identity = MockIdentity::default();
        let mut payload = codec.build_payload(json!({}), 1, None);
        payload.schema = "state-relay.snapshot.v9".into();
        message.content = identity
            .encrypt(&payload.to_json().unwrap(), identity.public_key())
            .await
            .unwrap();

        let err = codec.parse_message(&message).await.unwrap_err();
        match err {
            SnapshotError::Payload(RelayError::UnsupportedSchema(schema)) => {
                assert_eq!(schema, "state-relay.snapshot.v9");
            }
            other => panic!("expected UnsupportedSchema, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parse_rejects_undeserializable_content() {
        let codec = codec_with(Arc::new(MockIdentity::default()));
        let mut message = codec.build_message(json!({}), 1, None).await.unwrap();

        let identity = MockIdentity::default();
        message.content = identity
            .encrypt("this is not a payload", identity.public_key())
            .await
            .unwrap();

        let err = codec.parse_message(&message).await.unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Payload(RelayError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn prev_reference_survives_the_trip() {
        let codec = codec_with(Arc::new(MockIdentity::default()));
        let prev = StateId::new();
        let message = codec.build_message(json!({}), 2, Some(prev)).await.unwrap();

        let result = codec.parse_message(&message).await.unwrap();
        assert_eq!(result.payload.prev, Some(prev));
    }

    #[tokio::test]
    async fn encrypt_failure_propagates() {
        let identity = Arc::new(MockIdentity::default());
        identity.fail_next_encrypt("hsm offline");
        let codec = codec_with(identity.clone());

        let err = codec.build_message(json!({}), 1, None).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Identity(_)));
        // Nothing was signed.
        assert_eq!(identity.calls().sign, 0);
    }
}
