//! Typed lifecycle notifications.
//!
//! Consumers register a handler per event kind, so each handler receives
//! the payload type for exactly that kind. Errors never travel through
//! events; failures surface only on the call that caused them.

use std::sync::Mutex;

use relay_types::{MessageId, SnapshotResult};

/// Payload of a `snapshot:published` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedSnapshot {
    /// Transport id of the published message.
    pub message_id: MessageId,
    /// Revision that was published.
    pub rev: u64,
}

/// A lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// A snapshot was published by this instance.
    SnapshotPublished(PublishedSnapshot),
    /// A snapshot was received and parsed.
    SnapshotReceived(SnapshotResult),
}

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Per-kind handler registry.
#[derive(Default)]
pub struct EventListeners {
    published: Mutex<Vec<Handler<PublishedSnapshot>>>,
    received: Mutex<Vec<Handler<SnapshotResult>>>,
}

impl EventListeners {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `snapshot:published`.
    pub fn on_snapshot_published(&self, handler: impl Fn(&PublishedSnapshot) + Send + Sync + 'static) {
        self.published.lock().unwrap().push(Box::new(handler));
    }

    /// Register a handler for `snapshot:received`.
    pub fn on_snapshot_received(&self, handler: impl Fn(&SnapshotResult) + Send + Sync + 'static) {
        self.received.lock().unwrap().push(Box::new(handler));
    }

    /// Dispatch a notification to the handlers registered for its kind.
    pub fn emit(&self, event: &RelayEvent) {
        match event {
            RelayEvent::SnapshotPublished(published) => {
                for handler in self.published.lock().unwrap().iter() {
                    handler(published);
                }
            }
            RelayEvent::SnapshotReceived(result) => {
                for handler in self.received.lock().unwrap().iter() {
                    handler(result);
                }
            }
        }
    }

    /// Detach every registered handler.
    pub fn detach_all(&self) {
        self.published.lock().unwrap().clear();
        self.received.lock().unwrap().clear();
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("published", &self.published.lock().unwrap().len())
            .field("received", &self.received.lock().unwrap().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn handlers_fire_per_kind() {
        let listeners = EventListeners::new();
        let published = Arc::new(AtomicUsize::new(0));
        let p = published.clone();
        listeners.on_snapshot_published(move |_| {
            p.fetch_add(1, Ordering::SeqCst);
        });

        listeners.emit(&RelayEvent::SnapshotPublished(PublishedSnapshot {
            message_id: MessageId::new("m1"),
            rev: 1,
        }));

        assert_eq!(published.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn published_payload_reaches_handler() {
        let listeners = EventListeners::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        listeners.on_snapshot_published(move |e| {
            *sink.lock().unwrap() = Some(e.clone());
        });

        listeners.emit(&RelayEvent::SnapshotPublished(PublishedSnapshot {
            message_id: MessageId::new("m42"),
            rev: 42,
        }));

        let event = seen.lock().unwrap().clone().unwrap();
        assert_eq!(event.message_id, MessageId::new("m42"));
        assert_eq!(event.rev, 42);
    }

    #[test]
    fn detach_all_silences_handlers() {
        let listeners = EventListeners::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        listeners.on_snapshot_published(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        listeners.detach_all();
        listeners.emit(&RelayEvent::SnapshotPublished(PublishedSnapshot {
            message_id: MessageId::new("m"),
            rev: 1,
        }));

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
