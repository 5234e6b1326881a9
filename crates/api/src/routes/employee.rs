//! Route definitions for the `/employees` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::employee;
use crate::state::AppState;

/// Routes mounted at `/employees`.
///
/// ```text
/// GET    /                      -> list_employees
/// POST   /                      -> create_employee
/// GET    /me                    -> get_me
/// GET    /{id}                  -> get_employee
/// PUT    /{id}                  -> update_employee
/// DELETE /{id}                  -> deactivate_employee
/// GET    /{id}/direct-reports   -> list_direct_reports
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(employee::list_employees).post(employee::create_employee),
        )
        .route("/me", get(employee::get_me))
        .route(
            "/{id}",
            get(employee::get_employee)
                .put(employee::update_employee)
                .delete(employee::deactivate_employee),
        )
        .route("/{id}/direct-reports", get(employee::list_direct_reports))
}
