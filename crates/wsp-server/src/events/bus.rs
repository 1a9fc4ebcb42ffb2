//! In-process event bus: a single broadcast channel shared by WS fan-out and
//! the webhook trigger.
//!
//! Subscriber registration is synchronous — both consumers call [`EventBus::subscribe`]
//! at startup (or per-connection, for WS) and filter the firehose themselves, rather
//! than the bus tracking per-workspace channels. This keeps the publisher's `publish`
//! call non-blocking and independent of how many or which workspaces have listeners.

use jiff::Timestamp;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default channel capacity; a slow subscriber that falls this far behind
/// starts missing events ([`broadcast::error::RecvError::Lagged`]) rather
/// than applying backpressure to publishers.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A domain event published to the bus.
///
/// `event` is `"<category>.<name>"` (e.g. `"file.created"`, `"claim.expired"`);
/// `path` is the file path the event concerns, used by scope filtering in the
/// webhook trigger and WS subscription matching — `None` for workspace-level
/// events with no single affected path (e.g. `settings.changed`).
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub workspace_id: Uuid,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub timestamp: Timestamp,
    pub data: serde_json::Value,
}

impl Event {
    /// Creates a new event stamped with the current time.
    pub fn new(
        workspace_id: Uuid,
        event: impl Into<String>,
        path: Option<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            workspace_id,
            event: event.into(),
            path,
            timestamp: Timestamp::now(),
            data,
        }
    }

    /// Returns whether this event's `event` name is in `subscribed` under the
    /// `*` wildcard / exact / top-level-category matching rule.
    pub fn matches_subscription(&self, subscribed: &str) -> bool {
        subscribed == "*"
            || subscribed == self.event
            || self
                .event
                .strip_prefix(subscribed)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// A process-wide publish/subscribe channel for domain events.
///
/// Cheap to clone; every clone shares the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes `event` to every current subscriber. A publish with no
    /// subscribers is a no-op; this never blocks on a slow consumer.
    pub fn publish(&self, event: Event) {
        // No receivers is the common case for webhook-free, offline workspaces.
        let _ = self.sender.send(event);
    }

    /// Subscribes to the firehose of every published event. The caller is
    /// responsible for filtering by workspace, subscription pattern, and scope.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let workspace_id = Uuid::now_v7();
        bus.publish(Event::new(
            workspace_id,
            "file.created",
            Some("/notes/a.md".into()),
            serde_json::json!({"path": "/notes/a.md"}),
        ));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.workspace_id, workspace_id);
        assert_eq!(received.event, "file.created");
    }

    #[test]
    fn wildcard_and_category_subscription_match() {
        let event = Event::new(Uuid::nil(), "file.created", None, serde_json::Value::Null);
        assert!(event.matches_subscription("*"));
        assert!(event.matches_subscription("file"));
        assert!(event.matches_subscription("file.created"));
        assert!(!event.matches_subscription("filesystem"));
        assert!(!event.matches_subscription("task"));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.publish(Event::new(Uuid::nil(), "heartbeat", None, serde_json::Value::Null));
    }
}
