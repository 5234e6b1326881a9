//! System report for HR and administrators.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use okr_db::models::report::{RoleCount, StatusCount};
use okr_db::repositories::{EmployeeRepo, ReportRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireHr;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SystemReport {
    pub total_employees: i64,
    pub active_reviews: i64,
    /// `Completed` plus legacy `Signed` reviews.
    pub terminal_reviews: i64,
    pub reviews_by_status: Vec<StatusCount>,
    pub reviews_by_role: Vec<RoleCount>,
    pub average_overall_rating: Option<f64>,
}

/// GET /api/v1/reports/summary
pub async fn summary(
    RequireHr(_user): RequireHr,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let total_employees = EmployeeRepo::count_active(&state.pool).await?;
    let (active_reviews, terminal_reviews) =
        ReportRepo::count_active_and_terminal(&state.pool).await?;
    let reviews_by_status = ReportRepo::count_by_status(&state.pool).await?;
    let reviews_by_role = ReportRepo::count_by_role(&state.pool).await?;
    let average_overall_rating = ReportRepo::average_terminal_rating(&state.pool).await?;

    Ok(Json(DataResponse {
        data: SystemReport {
            total_employees,
            active_reviews,
            terminal_reviews,
            reviews_by_status,
            reviews_by_role,
            average_overall_rating,
        },
    }))
}
