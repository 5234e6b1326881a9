//! Well-known identity role names carried in access-token claims.
//!
//! These are identity roles (what a user may do), not the job roles stored
//! in `employee_roles` (which select an OKR template).

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_HR: &str = "hr";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_EMPLOYEE: &str = "employee";

/// All identity roles the API recognises.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_HR, ROLE_MANAGER, ROLE_EMPLOYEE];
