//! The acting user threaded explicitly into every lifecycle operation.

use crate::roles::{ROLE_ADMIN, ROLE_HR, ROLE_MANAGER};
use crate::types::DbId;

/// Who is performing an operation.
///
/// Built per request from the verified token claims plus the employee record
/// linked to the user (if any). Lifecycle code never looks up the current
/// user on its own; it only sees this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    /// Identity-provider user id (`claims.sub`).
    pub user_id: DbId,
    /// Identity role names (`admin`, `hr`, `manager`, `employee`).
    pub roles: Vec<String>,
    /// The employee record linked to this user, if one exists.
    pub employee_id: Option<DbId>,
}

impl ActingUser {
    pub fn new(user_id: DbId, roles: Vec<String>, employee_id: Option<DbId>) -> Self {
        Self {
            user_id,
            roles,
            employee_id,
        }
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// HR and Admin see and manage every employee and review.
    pub fn has_org_wide_access(&self) -> bool {
        self.is_in_role(ROLE_ADMIN) || self.is_in_role(ROLE_HR)
    }

    pub fn is_manager(&self) -> bool {
        self.is_in_role(ROLE_MANAGER)
    }

    /// Whether this user is the given employee.
    pub fn is_employee(&self, employee_id: DbId) -> bool {
        self.employee_id == Some(employee_id)
    }
}
