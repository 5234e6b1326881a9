//! Notification type tags and related-entity names.
//!
//! The type tags are stored verbatim in `notifications.notification_type`
//! and are what clients filter on.

use crate::types::DbId;

pub const NOTIFY_OKR_ASSIGNED: &str = "OKR_Assigned";
pub const NOTIFY_OKR_ASSIGNED_MANAGER: &str = "OKR_Assigned_Manager";
pub const NOTIFY_REVIEW_READY: &str = "Review_Ready";
pub const NOTIFY_REVIEW_SUBMITTED: &str = "Review_Submitted";
pub const NOTIFY_DISCUSSION_SCHEDULED: &str = "Discussion_Scheduled";
pub const NOTIFY_REVIEW_FINALIZED: &str = "Review_Finalized";
pub const NOTIFY_REVIEW_SIGNED: &str = "Review_Signed";
pub const NOTIFY_REVIEW_CREATION_PARTIAL: &str = "Review_Creation_Partial";
pub const NOTIFY_REVIEW_CREATION_FAILED: &str = "Review_Creation_Failed";

/// Related-entity type recorded on review notifications.
pub const ENTITY_PERFORMANCE_REVIEW: &str = "PerformanceReview";

/// Default number of notifications returned by the list endpoint.
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Client route for a review.
pub fn review_action_url(review_id: DbId) -> String {
    format!("/reviews/{review_id}")
}
