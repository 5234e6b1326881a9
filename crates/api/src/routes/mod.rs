pub mod employee;
pub mod health;
pub mod notification;
pub mod report;
pub mod review;
pub mod role;
pub mod template;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /employees                                 list, create (hr/admin)
/// /employees/me                              caller's employee record
/// /employees/{id}                            get, update, deactivate
/// /employees/{id}/direct-reports             direct reports
///
/// /roles                                     list, create (admin)
/// /roles/{id}                                update, delete (admin)
///
/// /templates                                 list, create (admin)
/// /templates/{id}                            get tree, update, deactivate
/// /templates/{id}/structure                  replace objectives (PUT, admin)
///
/// /reviews                                   list all (hr/admin), create one
/// /reviews/assign                            batch assignment (POST)
/// /reviews/mine                              caller's active reviews
/// /reviews/mine/history                      caller's completed reviews
/// /reviews/team                              reviews the caller manages
/// /reviews/pending                           awaiting the caller's manager review
/// /reviews/discussions/upcoming              scheduled discussions
/// /reviews/{id}                              review graph with comments
/// /reviews/{id}/submit-for-employee          Draft -> Employee_Review (POST)
/// /reviews/{id}/self-assessment              save draft (PUT)
/// /reviews/{id}/self-assessment/submit       Employee_Review -> Manager_Review (POST)
/// /reviews/{id}/manager-review               save / schedule / finalize (PUT)
/// /reviews/{id}/discussion                   Manager_Review -> Discussion (POST)
/// /reviews/{id}/sign/employee                employee signature (POST)
/// /reviews/{id}/sign/manager                 manager signature (POST)
/// /reviews/{id}/comments                     list, add
///
/// /notifications                             list
/// /notifications/unread-count                unread count
/// /notifications/read-all                    mark all read (POST)
/// /notifications/{id}/read                   mark one read (POST)
///
/// /reports/summary                           system report (hr/admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/employees", employee::router())
        .nest("/roles", role::router())
        .nest("/templates", template::router())
        .nest("/reviews", review::router())
        .nest("/notifications", notification::router())
        .nest("/reports", report::router())
}
