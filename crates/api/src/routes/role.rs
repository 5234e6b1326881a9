//! Route definitions for the `/roles` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

/// Routes mounted at `/roles`.
///
/// ```text
/// GET    /       -> list_roles
/// POST   /       -> create_role
/// PUT    /{id}   -> update_role
/// DELETE /{id}   -> delete_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(role::list_roles).post(role::create_role))
        .route("/{id}", put(role::update_role).delete(role::delete_role))
}
