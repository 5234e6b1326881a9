//! Repository for `performance_reviews` and its owned `objectives` /
//! `key_results` graph.

use okr_core::review::{ACTIVE_STATUSES, STATUS_DISCUSSION};
use okr_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::review::{
    KeyResult, NewObjective, NewReview, Objective, ObjectiveNode, PerformanceReview, ReviewGraph,
    ReviewSummary,
};

const COLUMNS: &str = "id, employee_id, manager_id, template_id, status, \
     review_period_start, review_period_end, self_assessment, manager_assessment, \
     final_assessment, discussion_notes, overall_rating, submitted_at, employee_submitted_at, \
     manager_reviewed_at, scheduled_discussion_at, discussion_at, finalized_at, \
     employee_signature, employee_signed_at, manager_signature, manager_signed_at, \
     version, created_at, updated_at";

const OBJECTIVE_COLUMNS: &str =
    "id, review_id, name, description, weight, sort_order, created_at, updated_at";

const KEY_RESULT_COLUMNS: &str = "id, objective_id, name, target, measure, measurement_source, \
     weight, sort_order, rating_1_description, rating_2_description, rating_3_description, \
     rating_4_description, rating_5_description, employee_rating, manager_rating, final_rating, \
     employee_comments, manager_comments, final_comments, discussion_notes, \
     employee_rated_at, manager_rated_at, final_rated_at, created_at, updated_at";

const SUMMARY_SELECT: &str = "SELECT r.id, r.employee_id, \
        (e.first_name || ' ' || e.last_name) AS employee_name, \
        r.manager_id, (m.first_name || ' ' || m.last_name) AS manager_name, \
        r.template_id, t.name AS template_name, r.status, \
        r.review_period_start, r.review_period_end, r.overall_rating, \
        r.scheduled_discussion_at, r.finalized_at, r.updated_at \
     FROM performance_reviews r \
     JOIN employees e ON e.id = r.employee_id \
     JOIN employees m ON m.id = r.manager_id \
     LEFT JOIN okr_templates t ON t.id = r.template_id";

/// Filters for [`ReviewRepo::list`]. `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub employee_id: Option<DbId>,
    pub manager_id: Option<DbId>,
    pub statuses: Option<Vec<String>>,
}

/// Provides persistence for performance reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Whether the employee already has a review in an active status.
    pub async fn has_active_review(pool: &PgPool, employee_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM performance_reviews \
             WHERE employee_id = $1 AND status = ANY($2))",
        )
        .bind(employee_id)
        .bind(ACTIVE_STATUSES)
        .fetch_one(pool)
        .await
    }

    /// Insert a `Draft` review with its objectives and key results in one
    /// transaction.
    pub async fn create_graph(
        pool: &PgPool,
        review: &NewReview,
        objectives: &[NewObjective],
    ) -> Result<PerformanceReview, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO performance_reviews \
                (employee_id, manager_id, template_id, review_period_start, review_period_end) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, PerformanceReview>(&query)
            .bind(review.employee_id)
            .bind(review.manager_id)
            .bind(review.template_id)
            .bind(review.review_period_start)
            .bind(review.review_period_end)
            .fetch_one(&mut *tx)
            .await?;

        for objective in objectives {
            let objective_id: DbId = sqlx::query_scalar(
                "INSERT INTO objectives (review_id, name, description, weight, sort_order) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id",
            )
            .bind(created.id)
            .bind(&objective.name)
            .bind(&objective.description)
            .bind(objective.weight)
            .bind(objective.sort_order)
            .fetch_one(&mut *tx)
            .await?;

            for kr in &objective.key_results {
                sqlx::query(
                    "INSERT INTO key_results \
                        (objective_id, name, target, measure, measurement_source, weight, \
                         sort_order, rating_1_description, rating_2_description, \
                         rating_3_description, rating_4_description, rating_5_description) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
                )
                .bind(objective_id)
                .bind(&kr.name)
                .bind(&kr.target)
                .bind(&kr.measure)
                .bind(&kr.measurement_source)
                .bind(kr.weight)
                .bind(kr.sort_order)
                .bind(&kr.rating_descriptions[0])
                .bind(&kr.rating_descriptions[1])
                .bind(&kr.rating_descriptions[2])
                .bind(&kr.rating_descriptions[3])
                .bind(&kr.rating_descriptions[4])
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PerformanceReview>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM performance_reviews WHERE id = $1");
        sqlx::query_as::<_, PerformanceReview>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a review with its objectives and key results in sort order, all
    /// from one REPEATABLE READ snapshot.
    pub async fn load_graph(pool: &PgPool, id: DbId) -> Result<Option<ReviewGraph>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM performance_reviews WHERE id = $1");
        let Some(review) = sqlx::query_as::<_, PerformanceReview>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {OBJECTIVE_COLUMNS} FROM objectives \
             WHERE review_id = $1 \
             ORDER BY sort_order ASC, id ASC"
        );
        let objectives = sqlx::query_as::<_, Objective>(&query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {KEY_RESULT_COLUMNS} FROM key_results \
             WHERE objective_id IN (SELECT id FROM objectives WHERE review_id = $1) \
             ORDER BY sort_order ASC, id ASC"
        );
        let key_results = sqlx::query_as::<_, KeyResult>(&query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let objectives = objectives
            .into_iter()
            .map(|objective| ObjectiveNode {
                key_results: key_results
                    .iter()
                    .filter(|kr| kr.objective_id == objective.id)
                    .cloned()
                    .collect(),
                objective,
            })
            .collect();

        Ok(Some(ReviewGraph { review, objectives }))
    }

    /// Write back the mutable parts of a review graph in one transaction.
    ///
    /// The review row is only updated if its `version` still matches the
    /// loaded graph; the version is then incremented. Returns `None` (and
    /// writes nothing) when another writer got there first.
    pub async fn save_graph(
        pool: &PgPool,
        graph: &ReviewGraph,
    ) -> Result<Option<PerformanceReview>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let r = &graph.review;

        let query = format!(
            "UPDATE performance_reviews SET \
                status = $3, \
                self_assessment = $4, \
                manager_assessment = $5, \
                final_assessment = $6, \
                discussion_notes = $7, \
                overall_rating = $8, \
                submitted_at = $9, \
                employee_submitted_at = $10, \
                manager_reviewed_at = $11, \
                scheduled_discussion_at = $12, \
                discussion_at = $13, \
                finalized_at = $14, \
                employee_signature = $15, \
                employee_signed_at = $16, \
                manager_signature = $17, \
                manager_signed_at = $18, \
                version = version + 1 \
             WHERE id = $1 AND version = $2 \
             RETURNING {COLUMNS}"
        );
        let saved = sqlx::query_as::<_, PerformanceReview>(&query)
            .bind(r.id)
            .bind(r.version)
            .bind(&r.status)
            .bind(&r.self_assessment)
            .bind(&r.manager_assessment)
            .bind(&r.final_assessment)
            .bind(&r.discussion_notes)
            .bind(r.overall_rating)
            .bind(r.submitted_at)
            .bind(r.employee_submitted_at)
            .bind(r.manager_reviewed_at)
            .bind(r.scheduled_discussion_at)
            .bind(r.discussion_at)
            .bind(r.finalized_at)
            .bind(&r.employee_signature)
            .bind(r.employee_signed_at)
            .bind(&r.manager_signature)
            .bind(r.manager_signed_at)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(saved) = saved else {
            return Ok(None);
        };

        for kr in graph.key_results() {
            sqlx::query(
                "UPDATE key_results SET \
                    employee_rating = $2, \
                    manager_rating = $3, \
                    final_rating = $4, \
                    employee_comments = $5, \
                    manager_comments = $6, \
                    final_comments = $7, \
                    discussion_notes = $8, \
                    employee_rated_at = $9, \
                    manager_rated_at = $10, \
                    final_rated_at = $11 \
                 WHERE id = $1",
            )
            .bind(kr.id)
            .bind(kr.employee_rating)
            .bind(kr.manager_rating)
            .bind(kr.final_rating)
            .bind(&kr.employee_comments)
            .bind(&kr.manager_comments)
            .bind(&kr.final_comments)
            .bind(&kr.discussion_notes)
            .bind(kr.employee_rated_at)
            .bind(kr.manager_rated_at)
            .bind(kr.final_rated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(saved))
    }

    /// List review summaries matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ReviewFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReviewSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT} \
             WHERE ($1::BIGINT IS NULL OR r.employee_id = $1) \
               AND ($2::BIGINT IS NULL OR r.manager_id = $2) \
               AND ($3::TEXT[] IS NULL OR r.status = ANY($3)) \
             ORDER BY r.created_at DESC, r.id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ReviewSummary>(&query)
            .bind(filter.employee_id)
            .bind(filter.manager_id)
            .bind(&filter.statuses)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Reviews in `Discussion` whose scheduled slot is at or after `now`,
    /// soonest first. `manager_id = None` lists every manager's discussions.
    pub async fn list_upcoming_discussions(
        pool: &PgPool,
        manager_id: Option<DbId>,
        now: Timestamp,
    ) -> Result<Vec<ReviewSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT} \
             WHERE r.status = $1 \
               AND r.scheduled_discussion_at >= $2 \
               AND ($3::BIGINT IS NULL OR r.manager_id = $3) \
             ORDER BY r.scheduled_discussion_at ASC"
        );
        sqlx::query_as::<_, ReviewSummary>(&query)
            .bind(STATUS_DISCUSSION)
            .bind(now)
            .bind(manager_id)
            .fetch_all(pool)
            .await
    }
}
