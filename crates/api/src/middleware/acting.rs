//! Resolves the [`ActingUser`] for a request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use okr_core::identity::ActingUser;
use okr_db::repositories::EmployeeRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated user plus their linked employee record, if any.
///
/// ```ignore
/// async fn handler(Acting(actor): Acting) -> AppResult<Json<()>> {
///     tracing::debug!(employee_id = ?actor.employee_id, "acting");
///     Ok(Json(()))
/// }
/// ```
pub struct Acting(pub ActingUser);

impl FromRequestParts<AppState> for Acting {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let employee = EmployeeRepo::find_by_user_id(&state.pool, user.user_id).await?;
        Ok(Acting(ActingUser::new(
            user.user_id,
            user.roles,
            employee.map(|e| e.id),
        )))
    }
}
