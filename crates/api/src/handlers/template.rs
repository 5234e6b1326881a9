//! Handlers for the `/templates` resource (OKR template catalog).
//!
//! Reading is open to any authenticated user; changes are admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use okr_core::error::CoreError;
use okr_core::template::{validate_template_name, validate_weight};
use okr_core::types::DbId;
use okr_db::models::template::{CreateTemplate, CreateTemplateObjective, UpdateTemplate};
use okr_db::repositories::{RoleRepo, TemplateRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "OkrTemplate",
        id,
    })
}

/// Validate names and weights across a whole objective tree.
fn validate_structure(objectives: &[CreateTemplateObjective]) -> AppResult<()> {
    for objective in objectives {
        if objective.name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Objective name must not be empty".into(),
            )));
        }
        validate_weight(objective.weight)?;
        for kr in &objective.key_results {
            if kr.name.trim().is_empty() {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Key result name must not be empty (objective '{}')",
                    objective.name
                ))));
            }
            validate_weight(kr.weight)?;
        }
    }
    Ok(())
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

/// GET /api/v1/templates
pub async fn list_templates(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/{id}
///
/// The template with its objectives and key results in sort order.
pub async fn get_template(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tree = TemplateRepo::load_tree(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: tree }))
}

/// POST /api/v1/templates
pub async fn create_template(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    validate_template_name(&input.name)?;
    validate_structure(&input.objectives)?;
    ensure_role_exists(&state, input.role_id).await?;

    let template = TemplateRepo::create(&state.pool, &input).await?;
    let tree = TemplateRepo::load_tree(&state.pool, template.id)
        .await?
        .ok_or_else(|| not_found(template.id))?;

    tracing::info!(
        template_id = template.id,
        key_results = tree.key_result_count(),
        user_id = user.user_id,
        "Template created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: tree })))
}

/// PUT /api/v1/templates/{id}
pub async fn update_template(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_template_name(name)?;
    }
    ensure_role_exists(&state, input.role_id).await?;

    let template = TemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(template_id = id, user_id = user.user_id, "Template updated");
    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/templates/{id}/structure
///
/// Replace every objective and key result of the template. Reviews already
/// created from it keep their own copies.
pub async fn replace_structure(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(objectives): Json<Vec<CreateTemplateObjective>>,
) -> AppResult<impl IntoResponse> {
    validate_structure(&objectives)?;

    TemplateRepo::replace_structure(&state.pool, id, &objectives)
        .await?
        .ok_or_else(|| not_found(id))?;
    let tree = TemplateRepo::load_tree(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        template_id = id,
        objectives = tree.objectives.len(),
        user_id = user.user_id,
        "Template structure replaced"
    );
    Ok(Json(DataResponse { data: tree }))
}

/// DELETE /api/v1/templates/{id}
///
/// Soft-delete: the template stays referenced by existing reviews.
pub async fn deactivate_template(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TemplateRepo::deactivate(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(template_id = id, user_id = user.user_id, "Template deactivated");
    Ok(StatusCode::NO_CONTENT)
}
