//! Handlers for the `/roles` resource (employee job roles).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use okr_core::error::CoreError;
use okr_core::types::DbId;
use okr_db::models::role::{CreateEmployeeRole, UpdateEmployeeRole};
use okr_db::repositories::RoleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_role_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Role name must not be empty".into(),
        )));
    }
    Ok(())
}

/// Reject a name already used by another role (case-insensitive).
async fn ensure_unique_name(
    state: &AppState,
    name: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if RoleRepo::find_by_name(&state.pool, name.trim(), exclude_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A role named '{}' already exists",
            name.trim()
        ))));
    }
    Ok(())
}

/// GET /api/v1/roles
pub async fn list_roles(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let roles = RoleRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// POST /api/v1/roles
pub async fn create_role(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateEmployeeRole>,
) -> AppResult<impl IntoResponse> {
    validate_role_name(&input.name)?;
    ensure_unique_name(&state, &input.name, None).await?;

    let role = RoleRepo::create(&state.pool, &input).await?;
    tracing::info!(role_id = role.id, user_id = user.user_id, "Role created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// PUT /api/v1/roles/{id}
pub async fn update_role(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEmployeeRole>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_role_name(name)?;
        ensure_unique_name(&state, name, Some(id)).await?;
    }

    let role = RoleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EmployeeRole",
            id,
        }))?;
    tracing::info!(role_id = id, user_id = user.user_id, "Role updated");
    Ok(Json(DataResponse { data: role }))
}

/// DELETE /api/v1/roles/{id}
///
/// Refused with 409 while any employee or template still references the role.
pub async fn delete_role(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (employees, templates) = RoleRepo::count_references(&state.pool, id).await?;
    if employees > 0 || templates > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Role is in use by {employees} employee(s) and {templates} template(s)"
        ))));
    }

    if !RoleRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "EmployeeRole",
            id,
        }));
    }
    tracing::info!(role_id = id, user_id = user.user_id, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}
