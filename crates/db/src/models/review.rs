//! Performance review models: the review row, its objective / key-result
//! graph, and review comments.

use chrono::NaiveDate;
use okr_core::error::CoreError;
use okr_core::review::ReviewStatus;
use okr_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `performance_reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PerformanceReview {
    pub id: DbId,
    pub employee_id: DbId,
    pub manager_id: DbId,
    pub template_id: Option<DbId>,
    pub status: String,
    pub review_period_start: NaiveDate,
    pub review_period_end: NaiveDate,
    pub self_assessment: String,
    pub manager_assessment: String,
    pub final_assessment: String,
    pub discussion_notes: String,
    pub overall_rating: Option<f64>,
    pub submitted_at: Option<Timestamp>,
    pub employee_submitted_at: Option<Timestamp>,
    pub manager_reviewed_at: Option<Timestamp>,
    pub scheduled_discussion_at: Option<Timestamp>,
    pub discussion_at: Option<Timestamp>,
    pub finalized_at: Option<Timestamp>,
    pub employee_signature: Option<String>,
    pub employee_signed_at: Option<Timestamp>,
    pub manager_signature: Option<String>,
    pub manager_signed_at: Option<Timestamp>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PerformanceReview {
    /// Parse the stored status string.
    pub fn status(&self) -> Result<ReviewStatus, CoreError> {
        ReviewStatus::from_str_db(&self.status)
    }
}

/// A row from the `objectives` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Objective {
    pub id: DbId,
    pub review_id: DbId,
    pub name: String,
    pub description: String,
    pub weight: f64,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `key_results` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct KeyResult {
    pub id: DbId,
    pub objective_id: DbId,
    pub name: String,
    pub target: String,
    pub measure: String,
    pub measurement_source: String,
    pub weight: f64,
    pub sort_order: i32,
    pub rating_1_description: String,
    pub rating_2_description: String,
    pub rating_3_description: String,
    pub rating_4_description: String,
    pub rating_5_description: String,
    pub employee_rating: Option<i16>,
    pub manager_rating: Option<i16>,
    pub final_rating: Option<i16>,
    pub employee_comments: String,
    pub manager_comments: String,
    pub final_comments: String,
    pub discussion_notes: String,
    pub employee_rated_at: Option<Timestamp>,
    pub manager_rated_at: Option<Timestamp>,
    pub final_rated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An objective with its key results in sort order.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveNode {
    #[serde(flatten)]
    pub objective: Objective,
    pub key_results: Vec<KeyResult>,
}

/// A review together with its owned objective / key-result graph.
///
/// Loaded once per lifecycle operation, mutated in memory, and written back
/// with [`ReviewRepo::save_graph`](crate::repositories::ReviewRepo::save_graph).
#[derive(Debug, Clone, Serialize)]
pub struct ReviewGraph {
    #[serde(flatten)]
    pub review: PerformanceReview,
    pub objectives: Vec<ObjectiveNode>,
}

impl ReviewGraph {
    pub fn key_results(&self) -> impl Iterator<Item = &KeyResult> {
        self.objectives.iter().flat_map(|o| o.key_results.iter())
    }

    pub fn key_results_mut(&mut self) -> impl Iterator<Item = &mut KeyResult> {
        self.objectives.iter_mut().flat_map(|o| o.key_results.iter_mut())
    }

    /// Look up a key result owned by this review.
    pub fn key_result_mut(&mut self, key_result_id: DbId) -> Option<&mut KeyResult> {
        self.key_results_mut().find(|kr| kr.id == key_result_id)
    }
}

/// New key result copied into a review.
#[derive(Debug, Clone, PartialEq)]
pub struct NewKeyResult {
    pub name: String,
    pub target: String,
    pub measure: String,
    pub measurement_source: String,
    pub weight: f64,
    pub sort_order: i32,
    pub rating_descriptions: [String; 5],
}

/// New objective copied into a review, with its key results.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObjective {
    pub name: String,
    pub description: String,
    pub weight: f64,
    pub sort_order: i32,
    pub key_results: Vec<NewKeyResult>,
}

/// DTO for inserting a review row. Status always starts as `Draft`.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub employee_id: DbId,
    pub manager_id: DbId,
    pub template_id: Option<DbId>,
    pub review_period_start: NaiveDate,
    pub review_period_end: NaiveDate,
}

/// A review row joined with participant and template names, for lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewSummary {
    pub id: DbId,
    pub employee_id: DbId,
    pub employee_name: String,
    pub manager_id: DbId,
    pub manager_name: String,
    pub template_id: Option<DbId>,
    pub template_name: Option<String>,
    pub status: String,
    pub review_period_start: NaiveDate,
    pub review_period_end: NaiveDate,
    pub overall_rating: Option<f64>,
    pub scheduled_discussion_at: Option<Timestamp>,
    pub finalized_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// A row from the `review_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewComment {
    pub id: DbId,
    pub review_id: DbId,
    pub commenter_user_id: DbId,
    pub comment_type: String,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for posting a comment on a review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewComment {
    pub comment_type: String,
    pub body: String,
}
