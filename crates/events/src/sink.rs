//! Notification persistence service.
//!
//! [`NotificationSink`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received [`NotificationEvent`] to the `notifications`
//! table. It runs as a long-lived background task and exits when the bus
//! sender is dropped.

use okr_db::models::notification::{CreateNotification, Notification};
use okr_db::repositories::NotificationRepo;
use okr_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::NotificationEvent;

/// Background service that persists notification events.
pub struct NotificationSink;

impl NotificationSink {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<NotificationEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            recipient_user_id = event.recipient_user_id,
                            notification_type = %event.notification_type,
                            "Failed to persist notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification sink lagged, some notifications were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification sink shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event as a notification row.
    pub async fn persist(
        pool: &DbPool,
        event: &NotificationEvent,
    ) -> Result<Notification, sqlx::Error> {
        let input = CreateNotification {
            user_id: event.recipient_user_id,
            sender_user_id: event.sender_user_id,
            title: event.title.clone(),
            message: event.message.clone(),
            notification_type: event.notification_type.clone(),
            action_url: event.action_url.clone(),
            related_entity_id: event.related_entity_id,
            related_entity_type: event.related_entity_type.clone(),
        };
        NotificationRepo::create(pool, &input).await
    }
}
