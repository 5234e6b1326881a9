//! Aggregate rows for the system report.

use serde::Serialize;
use sqlx::FromRow;

/// Review count for one status value.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Review count for one employee role label.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleCount {
    pub role_name: String,
    pub count: i64,
}
