//! Employee (job) role model and DTOs.

use okr_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `employee_roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmployeeRole {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a role.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployeeRole {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating a role. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEmployeeRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
