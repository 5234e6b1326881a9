//! Employee record rules: names and the manager hierarchy.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

pub const MAX_NAME_LENGTH: usize = 100;

/// Validate a required person-name field.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}

/// Reject a manager assignment that would make the hierarchy cyclic.
///
/// `employee_id` is `None` for a not-yet-created employee, which can never
/// close a cycle. `manager_of` returns the current manager of an employee.
/// The walk stops on any pre-existing loop instead of spinning forever.
pub fn validate_manager_assignment<F>(
    employee_id: Option<DbId>,
    manager_id: Option<DbId>,
    manager_of: F,
) -> Result<(), CoreError>
where
    F: Fn(DbId) -> Option<DbId>,
{
    let (Some(employee_id), Some(manager_id)) = (employee_id, manager_id) else {
        return Ok(());
    };

    if employee_id == manager_id {
        return Err(CoreError::Validation(
            "An employee cannot be their own manager".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut current = Some(manager_id);
    while let Some(id) = current {
        if id == employee_id {
            return Err(CoreError::Validation(format!(
                "Assigning manager {manager_id} to employee {employee_id} would create a reporting cycle"
            )));
        }
        if !seen.insert(id) {
            break;
        }
        current = manager_of(id);
    }
    Ok(())
}
