//! Route definitions for the `/templates` resource.
//!
//! Reads require authentication; writes require the admin role.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::template;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                 -> list_templates
/// POST   /                 -> create_template
/// GET    /{id}             -> get_template
/// PUT    /{id}             -> update_template
/// DELETE /{id}             -> deactivate_template
/// PUT    /{id}/structure   -> replace_structure
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(template::list_templates).post(template::create_template),
        )
        .route(
            "/{id}",
            get(template::get_template)
                .put(template::update_template)
                .delete(template::deactivate_template),
        )
        .route("/{id}/structure", put(template::replace_structure))
}
