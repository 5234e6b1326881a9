//! Aggregate queries behind the HR / admin system report.

use okr_core::review::{ACTIVE_STATUSES, TERMINAL_STATUSES};
use sqlx::PgPool;

use crate::models::report::{RoleCount, StatusCount};

/// Read-only reporting queries.
pub struct ReportRepo;

impl ReportRepo {
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM performance_reviews \
             GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    /// Review counts grouped by the subject employee's role label.
    pub async fn count_by_role(pool: &PgPool) -> Result<Vec<RoleCount>, sqlx::Error> {
        sqlx::query_as::<_, RoleCount>(
            "SELECT e.role_name, COUNT(*) AS count \
             FROM performance_reviews r JOIN employees e ON e.id = r.employee_id \
             GROUP BY e.role_name ORDER BY e.role_name",
        )
        .fetch_all(pool)
        .await
    }

    /// `(active, terminal)` review counts.
    pub async fn count_active_and_terminal(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT \
                COUNT(*) FILTER (WHERE status = ANY($1)), \
                COUNT(*) FILTER (WHERE status = ANY($2)) \
             FROM performance_reviews",
        )
        .bind(ACTIVE_STATUSES)
        .bind(TERMINAL_STATUSES)
        .fetch_one(pool)
        .await
    }

    /// Mean overall rating across terminal reviews that carry one.
    pub async fn average_terminal_rating(pool: &PgPool) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(overall_rating) FROM performance_reviews \
             WHERE status = ANY($1) AND overall_rating IS NOT NULL",
        )
        .bind(TERMINAL_STATUSES)
        .fetch_one(pool)
        .await
    }
}
