//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use okr_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// NotificationEvent
// ---------------------------------------------------------------------------

/// A request to notify one user, emitted by a lifecycle transition.
///
/// Constructed via [`NotificationEvent::new`] and enriched with
/// [`with_sender`](NotificationEvent::with_sender),
/// [`with_action_url`](NotificationEvent::with_action_url) and
/// [`with_related`](NotificationEvent::with_related).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Identity user id of the recipient.
    pub recipient_user_id: DbId,
    /// Identity user id of whoever triggered the event.
    pub sender_user_id: Option<DbId>,
    pub title: String,
    pub message: String,
    /// Type tag, e.g. `"OKR_Assigned"`.
    pub notification_type: String,
    pub action_url: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub related_entity_type: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(
        recipient_user_id: DbId,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_user_id,
            sender_user_id: None,
            title: title.into(),
            message: message.into(),
            notification_type: notification_type.into(),
            action_url: None,
            related_entity_id: None,
            related_entity_type: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_sender(mut self, user_id: DbId) -> Self {
        self.sender_user_id = Some(user_id);
        self
    }

    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Attach the entity the notification is about.
    pub fn with_related(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.related_entity_type = Some(entity_type.into());
        self.related_entity_id = Some(entity_id);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use okr_events::bus::{EventBus, NotificationEvent};
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
///
/// bus.publish(NotificationEvent::new(7, "OKR_Assigned", "New OKR", "You have a new review"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<NotificationEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: NotificationEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = NotificationEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers, i.e. running sinks.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = NotificationEvent::new(42, "Review_Submitted", "Submitted", "Ready for you")
            .with_sender(7)
            .with_action_url("/reviews/3")
            .with_related("PerformanceReview", 3);

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.recipient_user_id, 42);
        assert_eq!(received.notification_type, "Review_Submitted");
        assert_eq!(received.sender_user_id, Some(7));
        assert_eq!(received.action_url.as_deref(), Some("/reviews/3"));
        assert_eq!(received.related_entity_type.as_deref(), Some("PerformanceReview"));
        assert_eq!(received.related_entity_id, Some(3));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish_all([NotificationEvent::new(1, "OKR_Assigned", "t", "m")]);

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1, e2);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(NotificationEvent::new(1, "orphan", "t", "m"));
    }

    #[test]
    fn subscriber_count_tracks_live_receivers() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);

        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn new_event_has_empty_optional_fields() {
        let event = NotificationEvent::new(5, "OKR_Assigned", "t", "m");
        assert!(event.sender_user_id.is_none());
        assert!(event.action_url.is_none());
        assert!(event.related_entity_id.is_none());
        assert!(event.related_entity_type.is_none());
    }
}
