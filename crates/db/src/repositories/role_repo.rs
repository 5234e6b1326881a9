//! Repository for the `employee_roles` table.

use okr_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{CreateEmployeeRole, EmployeeRole, UpdateEmployeeRole};

const COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

/// Provides CRUD operations for employee roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new role. Names are unique case-insensitively (`uq_employee_roles_name`).
    pub async fn create(
        pool: &PgPool,
        input: &CreateEmployeeRole,
    ) -> Result<EmployeeRole, sqlx::Error> {
        let query = format!(
            "INSERT INTO employee_roles (name, description) \
             VALUES ($1, COALESCE($2, '')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmployeeRole>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EmployeeRole>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employee_roles WHERE id = $1");
        sqlx::query_as::<_, EmployeeRole>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup by name, optionally excluding one id.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<EmployeeRole>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employee_roles \
             WHERE LOWER(name) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2)"
        );
        sqlx::query_as::<_, EmployeeRole>(&query)
            .bind(name.trim())
            .bind(exclude_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<EmployeeRole>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employee_roles \
             WHERE ($1 OR is_active = true) \
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, EmployeeRole>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a role. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmployeeRole,
    ) -> Result<Option<EmployeeRole>, sqlx::Error> {
        let query = format!(
            "UPDATE employee_roles SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                is_active = COALESCE($4, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmployeeRole>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Number of employees and templates that reference the role.
    pub async fn count_references(pool: &PgPool, id: DbId) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT \
                (SELECT COUNT(*) FROM employees WHERE role_id = $1), \
                (SELECT COUNT(*) FROM okr_templates WHERE role_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Hard-delete a role. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employee_roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
