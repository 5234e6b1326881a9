//! In-app notification model.

use okr_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub sender_user_id: Option<DbId>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub related_entity_id: Option<DbId>,
    pub related_entity_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub sender_user_id: Option<DbId>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub action_url: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub related_entity_type: Option<String>,
}
