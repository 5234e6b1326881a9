//! Repository for the `review_comments` table.

use okr_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::ReviewComment;

const COLUMNS: &str = "id, review_id, commenter_user_id, comment_type, body, created_at, updated_at";

/// Provides persistence for review comments.
pub struct ReviewCommentRepo;

impl ReviewCommentRepo {
    pub async fn create(
        pool: &PgPool,
        review_id: DbId,
        commenter_user_id: DbId,
        comment_type: &str,
        body: &str,
    ) -> Result<ReviewComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_comments (review_id, commenter_user_id, comment_type, body) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewComment>(&query)
            .bind(review_id)
            .bind(commenter_user_id)
            .bind(comment_type)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// Comments on a review, oldest first.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
    ) -> Result<Vec<ReviewComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM review_comments \
             WHERE review_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ReviewComment>(&query)
            .bind(review_id)
            .fetch_all(pool)
            .await
    }
}
