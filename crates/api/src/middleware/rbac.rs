//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose roles do not
//! meet the minimum requirement. Relationship checks (is this the review's
//! manager?) happen later in the lifecycle engine.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use okr_core::error::CoreError;
use okr_core::roles::{ROLE_ADMIN, ROLE_HR, ROLE_MANAGER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_any(
    parts: &mut Parts,
    state: &AppState,
    roles: &[&str],
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.has_any_role(roles) {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_any(parts, state, &[ROLE_ADMIN], "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `hr` or `admin`.
pub struct RequireHr(pub AuthUser);

impl FromRequestParts<AppState> for RequireHr {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_any(parts, state, &[ROLE_HR, ROLE_ADMIN], "HR or Admin role required")
            .await
            .map(RequireHr)
    }
}

/// Requires `manager`, `hr` or `admin`.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_any(
            parts,
            state,
            &[ROLE_MANAGER, ROLE_HR, ROLE_ADMIN],
            "Manager, HR or Admin role required",
        )
        .await
        .map(RequireManager)
    }
}
