//! StateRelay - the synchronizer.
//!
//! Drives the publish and fetch-latest flows, remembers what this instance
//! last published, and broadcasts lifecycle notifications. All protocol
//! logic lives in the codec and relay-core; this module orchestrates.
//!
//! ```text
//! Application → StateRelay → RelayPool → Network
//!                   ↓
//!             SnapshotCodec → Identity
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use relay_core::{select_best, Clock, RandomIds, StateIdSource, SystemClock};
use relay_types::{MessageId, SnapshotResult, StateId, SNAPSHOT_KIND};

use crate::config::RelayConfig;
use crate::events::{EventListeners, PublishedSnapshot, RelayEvent};
use crate::identity::Identity;
use crate::pool::{MessageFilter, PoolError, RelayPool, Subscription, SubscriptionHandlers};
use crate::snapshot::{SnapshotCodec, SnapshotError};

/// Synchronizer errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Building or parsing a snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The transport pool failed.
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Ephemeral connectivity and bookkeeping view.
///
/// Recomputed on every call; nothing here is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStatus {
    /// Per-endpoint connectivity.
    pub connected: HashMap<String, bool>,
    /// Revision of the last snapshot this instance published.
    pub last_published_rev: Option<u64>,
    /// Message id of the last snapshot this instance published.
    pub last_published_message_id: Option<MessageId>,
}

/// The synchronizer: orchestrates publish and fetch-latest for one stream.
///
/// Owns the pool's lifecycle. The only mutable state is the last-published
/// `(rev, message id)` pair, written once per completed publish; `rev`
/// ordering across publishes is the caller's contract, not this layer's.
pub struct StateRelay<P: RelayPool> {
    config: RelayConfig,
    pool: P,
    identity: Arc<dyn Identity>,
    codec: Arc<SnapshotCodec>,
    listeners: Arc<EventListeners>,
    last_published: Mutex<Option<PublishedSnapshot>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl<P: RelayPool> StateRelay<P> {
    /// Create a synchronizer with the system clock and random state ids.
    pub fn new(config: RelayConfig, pool: P, identity: Arc<dyn Identity>) -> Self {
        Self::with_sources(config, pool, identity, Arc::new(SystemClock), Arc::new(RandomIds))
    }

    /// Create a synchronizer with injected time and id sources.
    pub fn with_sources(
        config: RelayConfig,
        pool: P,
        identity: Arc<dyn Identity>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn StateIdSource>,
    ) -> Self {
        let codec = Arc::new(SnapshotCodec::new(
            config.app.clone(),
            config.options.max_snapshot_bytes,
            identity.clone(),
            clock,
            ids,
        ));
        Self {
            config,
            pool,
            identity,
            codec,
            listeners: Arc::new(EventListeners::new()),
            last_published: Mutex::new(None),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Register a handler for `snapshot:published` notifications.
    pub fn on_snapshot_published(&self, handler: impl Fn(&PublishedSnapshot) + Send + Sync + 'static) {
        self.listeners.on_snapshot_published(handler);
    }

    /// Register a handler for `snapshot:received` notifications.
    pub fn on_snapshot_received(&self, handler: impl Fn(&SnapshotResult) + Send + Sync + 'static) {
        self.listeners.on_snapshot_received(handler);
    }

    /// Publish a snapshot of `data` at revision `rev`.
    ///
    /// On success, records the revision and message id as last-published
    /// and emits `snapshot:published`. On any failure the error propagates,
    /// no state is mutated, and no notification fires. Per-endpoint publish
    /// failures are the pool's concern and do not fail the call.
    pub async fn publish_snapshot(
        &self,
        data: serde_json::Value,
        rev: u64,
    ) -> Result<PublishedSnapshot, ClientError> {
        self.publish_snapshot_after(data, rev, None).await
    }

    /// Publish a snapshot carrying an advisory `prev` reference.
    pub async fn publish_snapshot_after(
        &self,
        data: serde_json::Value,
        rev: u64,
        prev: Option<StateId>,
    ) -> Result<PublishedSnapshot, ClientError> {
        let message = self.codec.build_message(data, rev, prev).await?;
        self.pool
            .publish(&self.config.endpoints.publish, &message)
            .await?;

        let published = PublishedSnapshot {
            message_id: message.id.clone(),
            rev,
        };
        *self.last_published.lock().unwrap() = Some(published.clone());

        tracing::debug!(rev, message_id = %message.id, "snapshot published");
        self.listeners
            .emit(&RelayEvent::SnapshotPublished(published.clone()));
        Ok(published)
    }

    /// Fetch the latest snapshot for this stream, authored by this identity.
    ///
    /// Selects the winner by tags alone, then decrypts and parses exactly
    /// that one message. Returns `None` (with no notification) when the
    /// query matches nothing.
    pub async fn fetch_latest_snapshot(&self) -> Result<Option<SnapshotResult>, ClientError> {
        let messages = self
            .pool
            .query(&self.config.endpoints.read, &self.snapshot_filter())
            .await?;

        let Some(best) = select_best(&messages) else {
            return Ok(None);
        };

        let result = self.codec.parse_message(best).await?;
        tracing::debug!(rev = result.rev, message_id = %result.message_id, "snapshot received");
        self.listeners
            .emit(&RelayEvent::SnapshotReceived(result.clone()));
        Ok(Some(result))
    }

    /// Subscribe to live snapshots for this stream.
    ///
    /// Each incoming message is parsed off the callback; a message that
    /// fails to parse is logged and skipped, the rest of the stream is
    /// unaffected. The subscription is retained and closed by
    /// [`StateRelay::destroy`].
    pub fn subscribe_snapshots(&self) {
        let codec = self.codec.clone();
        let listeners = self.listeners.clone();

        let handlers = SubscriptionHandlers::on_message(move |message| {
            let codec = codec.clone();
            let listeners = listeners.clone();
            tokio::spawn(async move {
                match codec.parse_message(&message).await {
                    Ok(result) => listeners.emit(&RelayEvent::SnapshotReceived(result)),
                    Err(e) => {
                        tracing::warn!(message_id = %message.id, "dropping unparseable snapshot: {e}")
                    }
                }
            });
        });

        let subscription =
            self.pool
                .subscribe(&self.config.endpoints.read, &self.snapshot_filter(), handlers);
        self.subscriptions.lock().unwrap().push(subscription);
    }

    /// Current connectivity plus last-published bookkeeping.
    pub fn status(&self) -> RelayStatus {
        let last = self.last_published.lock().unwrap().clone();
        RelayStatus {
            connected: self.pool.connectivity(),
            last_published_rev: last.as_ref().map(|p| p.rev),
            last_published_message_id: last.map(|p| p.message_id),
        }
    }

    /// Tear down: close retained subscriptions, destroy the pool, detach
    /// all notification listeners. Safe to call when nothing was ever
    /// subscribed. In-flight operations settle on their own; their results
    /// are simply not observed.
    pub fn destroy(&self) {
        for subscription in self.subscriptions.lock().unwrap().drain(..) {
            subscription.close();
        }
        self.pool.destroy();
        self.listeners.detach_all();
        tracing::debug!(stream = %self.config.app.stream_key(), "state relay destroyed");
    }

    /// The pool, for test verification.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    fn snapshot_filter(&self) -> MessageFilter {
        MessageFilter::new()
            .kinds(&[SNAPSHOT_KIND])
            .author(self.identity.public_key())
            .stream(self.config.app.stream_key().as_str())
    }
}

impl<P: RelayPool> std::fmt::Debug for StateRelay<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateRelay")
            .field("stream", &self.config.app.stream_key())
            .field("last_published", &self.last_published.lock().unwrap())
            .finish_non_exhaustive()
    }
}
