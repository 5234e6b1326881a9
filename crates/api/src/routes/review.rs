//! Route definitions for the `/reviews` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// GET    /                                -> list_reviews
/// POST   /                                -> create_review
/// POST   /assign                          -> assign_reviews
/// GET    /mine                            -> list_my_active
/// GET    /mine/history                    -> list_my_history
/// GET    /team                            -> list_team
/// GET    /pending                         -> list_pending
/// GET    /discussions/upcoming            -> list_upcoming_discussions
///
/// GET    /{id}                            -> get_review
/// POST   /{id}/submit-for-employee        -> submit_for_employee_review
/// PUT    /{id}/self-assessment            -> save_employee_draft
/// POST   /{id}/self-assessment/submit     -> submit_self_assessment
/// PUT    /{id}/manager-review             -> manager_review
/// POST   /{id}/discussion                 -> schedule_discussion
/// POST   /{id}/sign/employee              -> sign_as_employee
/// POST   /{id}/sign/manager               -> sign_as_manager
/// GET    /{id}/comments                   -> list_comments
/// POST   /{id}/comments                   -> add_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Creation and lists
        .route("/", get(review::list_reviews).post(review::create_review))
        .route("/assign", post(review::assign_reviews))
        .route("/mine", get(review::list_my_active))
        .route("/mine/history", get(review::list_my_history))
        .route("/team", get(review::list_team))
        .route("/pending", get(review::list_pending))
        .route(
            "/discussions/upcoming",
            get(review::list_upcoming_discussions),
        )
        // Lifecycle
        .route("/{id}", get(review::get_review))
        .route(
            "/{id}/submit-for-employee",
            post(review::submit_for_employee_review),
        )
        .route("/{id}/self-assessment", put(review::save_employee_draft))
        .route(
            "/{id}/self-assessment/submit",
            post(review::submit_self_assessment),
        )
        .route("/{id}/manager-review", put(review::manager_review))
        .route("/{id}/discussion", post(review::schedule_discussion))
        .route("/{id}/sign/employee", post(review::sign_as_employee))
        .route("/{id}/sign/manager", post(review::sign_as_manager))
        // Comments
        .route(
            "/{id}/comments",
            get(review::list_comments).post(review::add_comment),
        )
}
