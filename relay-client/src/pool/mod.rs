//! Transport pool abstraction.
//!
//! The pool publishes messages to a set of endpoints, queries stored
//! messages matching a filter, subscribes to a live stream, and reports
//! per-endpoint connectivity. Connection management, retries, and the wire
//! protocol are the implementation's concern, not this crate's.
//!
//! # Example
//!
//! ```ignore
//! let pool = MockPool::new();
//! let outcomes = pool.publish(&endpoints, &message).await?;
//! let stored = pool.query(&endpoints, &MessageFilter::new()).await?;
//! ```

mod mock;

pub use mock::MockPool;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use relay_types::SignedMessage;

/// Transport pool errors.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Publish failed on every endpoint or before reaching any.
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// Query failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// The pool has been destroyed.
    #[error("pool destroyed")]
    Destroyed,
}

/// A filter for querying or subscribing to messages.
///
/// Matches on message kind, author, and `d`-tag (stream key) equality; an
/// empty field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Wire kinds to match.
    pub kinds: Vec<u32>,
    /// Author public keys to match.
    pub authors: Vec<String>,
    /// `d` tag (addressable key) to match.
    pub stream: Option<String>,
}

impl MessageFilter {
    /// An empty filter matching every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given kinds.
    pub fn kinds(mut self, kinds: &[u32]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    /// Restrict to a single author.
    pub fn author(mut self, pubkey: &str) -> Self {
        self.authors = vec![pubkey.to_string()];
        self
    }

    /// Restrict to one addressable key.
    pub fn stream(mut self, key: &str) -> Self {
        self.stream = Some(key.to_string());
        self
    }

    /// Whether a message matches this filter.
    pub fn matches(&self, message: &SignedMessage) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&message.kind) {
            return false;
        }
        if !self.authors.is_empty() && !self.authors.contains(&message.pubkey) {
            return false;
        }
        if let Some(stream) = &self.stream {
            if message.tags.stream() != Some(stream.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Per-endpoint publish outcome. Failures on one endpoint are never fatal
/// to the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointOutcome {
    /// The endpoint this outcome refers to.
    pub endpoint: String,
    /// Failure reason, or `None` on success.
    pub error: Option<String>,
}

impl EndpointOutcome {
    /// Whether this endpoint accepted the message.
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Callbacks for a live subscription.
pub struct SubscriptionHandlers {
    /// Called for each matching message.
    pub on_message: Box<dyn Fn(SignedMessage) + Send + Sync>,
    /// Called once stored results have been delivered.
    pub on_end_of_stored: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called when the subscription closes, with the reason.
    pub on_close: Option<Box<dyn Fn(String) + Send + Sync>>,
}

impl SubscriptionHandlers {
    /// Handlers with just an on-message callback.
    pub fn on_message(f: impl Fn(SignedMessage) + Send + Sync + 'static) -> Self {
        Self {
            on_message: Box::new(f),
            on_end_of_stored: None,
            on_close: None,
        }
    }
}

impl std::fmt::Debug for SubscriptionHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandlers").finish_non_exhaustive()
    }
}

/// Cancellation handle for a live subscription.
///
/// Closing is idempotent; dropping without closing leaves the subscription
/// to the pool's own teardown.
pub struct Subscription {
    closer: std::sync::Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    /// Wrap a close callback into a handle.
    pub fn new(closer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            closer: std::sync::Mutex::new(Some(Box::new(closer))),
        }
    }

    /// Cancel the subscription. Subsequent calls are no-ops.
    pub fn close(&self) {
        if let Some(closer) = self.closer.lock().unwrap().take() {
            closer();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Transport pool trait.
///
/// Implementations handle the underlying publish/subscribe mechanism;
/// [`MockPool`] is provided for testing.
#[async_trait]
pub trait RelayPool: Send + Sync {
    /// Publish a message to the given endpoints.
    ///
    /// Returns one outcome per endpoint; per-endpoint failures do not
    /// affect the others.
    async fn publish(
        &self,
        endpoints: &[String],
        message: &SignedMessage,
    ) -> Result<Vec<EndpointOutcome>, PoolError>;

    /// Query stored messages matching the filter.
    async fn query(
        &self,
        endpoints: &[String],
        filter: &MessageFilter,
    ) -> Result<Vec<SignedMessage>, PoolError>;

    /// Subscribe to a live stream of matching messages.
    fn subscribe(
        &self,
        endpoints: &[String],
        filter: &MessageFilter,
        handlers: SubscriptionHandlers,
    ) -> Subscription;

    /// Current connectivity, endpoint to connected flag.
    fn connectivity(&self) -> HashMap<String, bool>;

    /// Tear the pool down, closing all connections.
    fn destroy(&self);
}
