//! Employee model and DTOs.

use okr_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    /// Identity-provider user id linked to this employee, if any.
    pub user_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Free-text job role label.
    pub role_name: String,
    pub role_id: Option<DbId>,
    pub position: String,
    pub line_of_business: String,
    pub manager_id: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Employee {
    pub fn full_name(&self) -> String {
        okr_core::employee::full_name(&self.first_name, &self.last_name)
    }
}

/// DTO for creating an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployee {
    pub user_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_name: Option<String>,
    pub role_id: Option<DbId>,
    pub position: Option<String>,
    pub line_of_business: Option<String>,
    pub manager_id: Option<DbId>,
}

/// DTO for updating an employee. `None` fields are left unchanged;
/// `clear_manager` removes the manager link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployee {
    pub user_id: Option<DbId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role_name: Option<String>,
    pub role_id: Option<DbId>,
    pub position: Option<String>,
    pub line_of_business: Option<String>,
    pub manager_id: Option<DbId>,
    #[serde(default)]
    pub clear_manager: bool,
}
