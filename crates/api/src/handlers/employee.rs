//! Handlers for the `/employees` resource.
//!
//! HR and Admin manage every employee. Managers see and update their direct
//! reports. Everyone can read their own record.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use okr_core::employee::{validate_manager_assignment, validate_name};
use okr_core::error::CoreError;
use okr_core::identity::ActingUser;
use okr_core::search::{clamp_limit, clamp_offset};
use okr_core::types::DbId;
use okr_db::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use okr_db::repositories::{EmployeeRepo, RoleRepo};
use serde::Deserialize;
use validator::{Validate, ValidateEmail};

use crate::error::{AppError, AppResult};
use crate::middleware::acting::Acting;
use crate::middleware::rbac::RequireHr;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    pub user_id: Option<DbId>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub last_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub role_name: Option<String>,
    pub role_id: Option<DbId>,
    pub position: Option<String>,
    pub line_of_business: Option<String>,
    pub manager_id: Option<DbId>,
}

impl From<CreateEmployeeRequest> for CreateEmployee {
    fn from(r: CreateEmployeeRequest) -> Self {
        Self {
            user_id: r.user_id,
            first_name: r.first_name.trim().to_string(),
            last_name: r.last_name.trim().to_string(),
            email: r.email.trim().to_string(),
            role_name: r.role_name,
            role_id: r.role_id,
            position: r.position,
            line_of_business: r.line_of_business,
            manager_id: r.manager_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListParams {
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// HR / Admin, or the employee's direct manager.
fn can_manage(actor: &ActingUser, employee: &Employee) -> bool {
    actor.has_org_wide_access() || employee.manager_id.is_some_and(|m| actor.is_employee(m))
}

/// Load an employee the caller may see, hiding the rest as not found.
async fn find_visible(state: &AppState, actor: &ActingUser, id: DbId) -> AppResult<Employee> {
    EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|e| actor.is_employee(e.id) || can_manage(actor, e))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))
}

async fn ensure_active_manager(state: &AppState, manager_id: DbId) -> AppResult<()> {
    match EmployeeRepo::find_by_id(&state.pool, manager_id).await? {
        Some(m) if m.is_active => Ok(()),
        _ => Err(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id: manager_id,
        })),
    }
}

async fn ensure_role_exists(state: &AppState, role_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = role_id {
        if RoleRepo::find_by_id(&state.pool, id).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "EmployeeRole",
                id,
            }));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/employees
///
/// HR / Admin list everyone; managers list their direct reports. Inactive
/// employees are only included on request by HR / Admin.
pub async fn list_employees(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Query(params): Query<EmployeeListParams>,
) -> AppResult<impl IntoResponse> {
    let include_inactive = params.include_inactive && actor.has_org_wide_access();

    let employees = if actor.has_org_wide_access() {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let offset = clamp_offset(params.offset);
        EmployeeRepo::list(&state.pool, include_inactive, limit, offset).await?
    } else if let Some(own_id) = actor.employee_id.filter(|_| actor.is_manager()) {
        EmployeeRepo::list_direct_reports(&state.pool, own_id, false).await?
    } else {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only managers, HR or administrators can list employees".into(),
        )));
    };

    Ok(Json(DataResponse { data: employees }))
}

/// GET /api/v1/employees/me
pub async fn get_me(
    Acting(actor): Acting,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let Some(id) = actor.employee_id else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id: actor.user_id,
        }));
    };
    let employee = find_visible(&state, &actor, id).await?;
    Ok(Json(DataResponse { data: employee }))
}

/// GET /api/v1/employees/{id}
pub async fn get_employee(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let employee = find_visible(&state, &actor, id).await?;
    Ok(Json(DataResponse { data: employee }))
}

/// GET /api/v1/employees/{id}/direct-reports
pub async fn list_direct_reports(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let manager = find_visible(&state, &actor, id).await?;
    let reports = EmployeeRepo::list_direct_reports(&state.pool, manager.id, false).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// POST /api/v1/employees
///
/// HR / Admin only. Returns 201 with the created employee.
pub async fn create_employee(
    RequireHr(user): RequireHr,
    State(state): State<AppState>,
    Json(input): Json<CreateEmployeeRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    ensure_role_exists(&state, input.role_id).await?;
    if let Some(manager_id) = input.manager_id {
        ensure_active_manager(&state, manager_id).await?;
    }

    let employee = EmployeeRepo::create(&state.pool, &input.into()).await?;

    tracing::info!(
        employee_id = employee.id,
        user_id = user.user_id,
        "Employee created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: employee })))
}

/// PUT /api/v1/employees/{id}
///
/// HR / Admin update anyone; managers update their direct reports but
/// cannot move them to another manager.
pub async fn update_employee(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEmployee>,
) -> AppResult<impl IntoResponse> {
    let existing = find_visible(&state, &actor, id).await?;
    if !can_manage(&actor, &existing) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only update your direct reports".into(),
        )));
    }

    if let Some(first) = &input.first_name {
        validate_name("First name", first)?;
    }
    if let Some(last) = &input.last_name {
        validate_name("Last name", last)?;
    }
    if let Some(email) = &input.email {
        if !email.validate_email() {
            return Err(AppError::Core(CoreError::Validation(
                "email must be a valid email address".into(),
            )));
        }
    }
    ensure_role_exists(&state, input.role_id).await?;

    let changes_manager = input.clear_manager || input.manager_id.is_some();
    if changes_manager {
        if !actor.has_org_wide_access() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only HR or administrators can reassign managers".into(),
            )));
        }
        let new_manager = if input.clear_manager {
            None
        } else {
            input.manager_id
        };
        if let Some(manager_id) = new_manager {
            ensure_active_manager(&state, manager_id).await?;
        }
        let links: HashMap<DbId, DbId> = EmployeeRepo::manager_links(&state.pool)
            .await?
            .into_iter()
            .collect();
        validate_manager_assignment(Some(id), new_manager, |e| links.get(&e).copied())?;
    }

    let employee = EmployeeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))?;

    tracing::info!(employee_id = id, user_id = actor.user_id, "Employee updated");
    Ok(Json(DataResponse { data: employee }))
}

/// DELETE /api/v1/employees/{id}
///
/// Soft-delete: the employee is marked inactive and hidden from lists.
pub async fn deactivate_employee(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let existing = find_visible(&state, &actor, id).await?;
    if !can_manage(&actor, &existing) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only deactivate your direct reports".into(),
        )));
    }

    if !EmployeeRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }));
    }

    tracing::info!(employee_id = id, user_id = actor.user_id, "Employee deactivated");
    Ok(StatusCode::NO_CONTENT)
}
