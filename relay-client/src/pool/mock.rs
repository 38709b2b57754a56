//! Mock transport pool for testing.
//!
//! Allows queueing query results, capturing published messages, and driving
//! live subscriptions by hand.

use super::{EndpointOutcome, MessageFilter, PoolError, RelayPool, Subscription, SubscriptionHandlers};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use relay_types::SignedMessage;

/// Mock pool for testing.
///
/// Captures publishes, returns queued query results, and lets tests feed
/// messages into active subscriptions via [`MockPool::deliver`]. Clones
/// share state, so a test can keep a handle while the client owns another.
#[derive(Debug, Default)]
pub struct MockPool {
    inner: Arc<Mutex<MockPoolInner>>,
}

#[derive(Default)]
struct MockPoolInner {
    destroyed: bool,
    published: Vec<SignedMessage>,
    query_results: VecDeque<Vec<SignedMessage>>,
    connectivity: HashMap<String, bool>,
    subscriptions: HashMap<u64, (MessageFilter, SubscriptionHandlers)>,
    next_subscription: u64,
    fail_next_publish: Option<String>,
    fail_next_query: Option<String>,
}

impl std::fmt::Debug for MockPoolInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPoolInner")
            .field("destroyed", &self.destroyed)
            .field("published", &self.published.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl MockPool {
    /// Create a new mock pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result set returned by the next `query()` call.
    pub fn queue_query_result(&self, messages: Vec<SignedMessage>) {
        self.inner.lock().unwrap().query_results.push_back(messages);
    }

    /// All messages that were published.
    pub fn published(&self) -> Vec<SignedMessage> {
        self.inner.lock().unwrap().published.clone()
    }

    /// The most recently published message.
    pub fn last_published(&self) -> Option<SignedMessage> {
        self.inner.lock().unwrap().published.last().cloned()
    }

    /// Set the connectivity flag reported for an endpoint.
    pub fn set_connected(&self, endpoint: &str, connected: bool) {
        self.inner
            .lock()
            .unwrap()
            .connectivity
            .insert(endpoint.to_string(), connected);
    }

    /// Cause the next `publish()` to fail with the given error.
    pub fn fail_next_publish(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_publish = Some(error.to_string());
    }

    /// Cause the next `query()` to fail with the given error.
    pub fn fail_next_query(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_query = Some(error.to_string());
    }

    /// Feed a message to every active subscription whose filter matches.
    pub fn deliver(&self, message: SignedMessage) {
        let inner = self.inner.lock().unwrap();
        for (filter, handlers) in inner.subscriptions.values() {
            if filter.matches(&message) {
                (handlers.on_message)(message.clone());
            }
        }
    }

    /// Number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.lock().unwrap().subscriptions.len()
    }

    /// Whether `destroy()` has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.lock().unwrap().destroyed
    }

    /// Clear all state (publishes, queues, subscriptions, connectivity).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockPoolInner::default();
    }
}

impl Clone for MockPool {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RelayPool for MockPool {
    async fn publish(
        &self,
        endpoints: &[String],
        message: &SignedMessage,
    ) -> Result<Vec<EndpointOutcome>, PoolError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.destroyed {
            return Err(PoolError::Destroyed);
        }
        if let Some(error) = inner.fail_next_publish.take() {
            return Err(PoolError::PublishFailed(error));
        }

        inner.published.push(message.clone());
        Ok(endpoints
            .iter()
            .map(|endpoint| EndpointOutcome {
                endpoint: endpoint.clone(),
                error: None,
            })
            .collect())
    }

    async fn query(
        &self,
        _endpoints: &[String],
        filter: &MessageFilter,
    ) -> Result<Vec<SignedMessage>, PoolError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.destroyed {
            return Err(PoolError::Destroyed);
        }
        if let Some(error) = inner.fail_next_query.take() {
            return Err(PoolError::QueryFailed(error));
        }

        // Queued results take priority; otherwise serve matching publishes,
        // the way a live relay would.
        if let Some(queued) = inner.query_results.pop_front() {
            return Ok(queued);
        }
        Ok(inner
            .published
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    fn subscribe(
        &self,
        _endpoints: &[String],
        filter: &MessageFilter,
        handlers: SubscriptionHandlers,
    ) -> Subscription {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_subscription;
        inner.next_subscription += 1;
        inner.subscriptions.insert(id, (filter.clone(), handlers));

        let pool = Arc::clone(&self.inner);
        Subscription::new(move || {
            pool.lock().unwrap().subscriptions.remove(&id);
        })
    }

    fn connectivity(&self) -> HashMap<String, bool> {
        self.inner.lock().unwrap().connectivity.clone()
    }

    fn destroy(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.destroyed = true;
        inner.subscriptions.clear();
    }
}
