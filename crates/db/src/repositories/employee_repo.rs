//! Repository for the `employees` table.
//!
//! Visibility is a single predicate: an employee is visible when
//! `is_active = true`. Every list method applies it unless the caller
//! explicitly asks for inactive rows.

use okr_core::types::DbId;
use sqlx::PgPool;

use crate::models::employee::{CreateEmployee, Employee, UpdateEmployee};

const COLUMNS: &str = "id, user_id, first_name, last_name, email, role_name, role_id, \
     position, line_of_business, manager_id, is_active, created_at, updated_at";

/// SQL fragment for the visible-employees predicate.
const VISIBLE: &str = "($1 OR is_active = true)";

/// Provides CRUD operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert a new employee, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEmployee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees \
                (user_id, first_name, last_name, email, role_name, role_id, \
                 position, line_of_business, manager_id) \
             VALUES ($1, $2, $3, $4, COALESCE($5, ''), $6, COALESCE($7, ''), COALESCE($8, ''), $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(input.user_id)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(input.email.trim())
            .bind(&input.role_name)
            .bind(input.role_id)
            .bind(&input.position)
            .bind(&input.line_of_business)
            .bind(input.manager_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the active employee record linked to an identity user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees WHERE user_id = $1 AND is_active = true"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several employees by id, in id order. Missing ids are absent.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Employee>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees WHERE {VISIBLE} \
             ORDER BY last_name ASC, first_name ASC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(include_inactive)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Employees whose `manager_id` is the given manager.
    pub async fn list_direct_reports(
        pool: &PgPool,
        manager_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees WHERE {VISIBLE} AND manager_id = $2 \
             ORDER BY last_name ASC, first_name ASC"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(include_inactive)
            .bind(manager_id)
            .fetch_all(pool)
            .await
    }

    /// Every `(employee_id, manager_id)` link, for hierarchy checks.
    pub async fn manager_links(pool: &PgPool) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT id, manager_id FROM employees WHERE manager_id IS NOT NULL",
        )
        .fetch_all(pool)
        .await
    }

    /// Update an employee. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmployee,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET \
                user_id = COALESCE($2, user_id), \
                first_name = COALESCE($3, first_name), \
                last_name = COALESCE($4, last_name), \
                email = COALESCE($5, email), \
                role_name = COALESCE($6, role_name), \
                role_id = COALESCE($7, role_id), \
                position = COALESCE($8, position), \
                line_of_business = COALESCE($9, line_of_business), \
                manager_id = CASE WHEN $11 THEN NULL ELSE COALESCE($10, manager_id) END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(input.user_id)
            .bind(input.first_name.as_deref().map(str::trim))
            .bind(input.last_name.as_deref().map(str::trim))
            .bind(input.email.as_deref().map(str::trim))
            .bind(&input.role_name)
            .bind(input.role_id)
            .bind(&input.position)
            .bind(&input.line_of_business)
            .bind(input.manager_id)
            .bind(input.clear_manager)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate an employee (set is_active = false).
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE employees SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of visible employees.
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE is_active = true")
            .fetch_one(pool)
            .await
    }
}
