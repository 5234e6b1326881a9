//! Handlers for the `/reviews` resource.
//!
//! Handlers only translate HTTP into calls on `okr_lifecycle`; every
//! relationship and status rule lives there.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use okr_core::identity::ActingUser;
use okr_core::review::{ReviewStatus, ACTIVE_STATUSES, STATUS_MANAGER_REVIEW, TERMINAL_STATUSES};
use okr_core::search::{clamp_limit, clamp_offset};
use okr_core::types::DbId;
use okr_db::models::review::{CreateReviewComment, ReviewSummary};
use okr_db::repositories::review_repo::ReviewFilter;
use okr_db::repositories::ReviewRepo;
use okr_lifecycle::engine::{
    DiscussionSlot, EmployeeAssessment, ManagerReview, SignatureParty,
};
use okr_lifecycle::instantiate::{self, AssignReviews};
use okr_lifecycle::service;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::acting::Acting;
use crate::middleware::rbac::RequireHr;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /reviews`: one review for one employee.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub employee_id: DbId,
    pub template_id: Option<DbId>,
    pub manager_id: Option<DbId>,
    pub review_period_start: NaiveDate,
    pub review_period_end: NaiveDate,
}

impl From<CreateReviewRequest> for AssignReviews {
    fn from(r: CreateReviewRequest) -> Self {
        Self {
            template_id: r.template_id,
            employee_ids: vec![r.employee_id],
            manager_id: r.manager_id,
            review_period_start: r.review_period_start,
            review_period_end: r.review_period_end,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn statuses(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(|s| s.to_string()).collect())
}

/// List reviews of the caller's own employee record. Users without one have none.
async fn list_own(
    state: &AppState,
    actor: &ActingUser,
    filter: impl FnOnce(DbId) -> ReviewFilter,
) -> AppResult<Vec<ReviewSummary>> {
    let Some(employee_id) = actor.employee_id else {
        return Ok(Vec::new());
    };
    Ok(ReviewRepo::list(&state.pool, &filter(employee_id), MAX_LIMIT, 0).await?)
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// POST /api/v1/reviews
///
/// Creates a single review. The body of the response is the same
/// instantiation report as the batch endpoint, so a skip is visible to
/// the caller rather than an error.
pub async fn create_review(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Json(input): Json<CreateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let request = AssignReviews::from(input);
    let report =
        instantiate::assign_reviews(&state.pool, &state.event_bus, &actor, &request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// POST /api/v1/reviews/assign
pub async fn assign_reviews(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Json(input): Json<AssignReviews>,
) -> AppResult<impl IntoResponse> {
    let report = instantiate::assign_reviews(&state.pool, &state.event_bus, &actor, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// GET /api/v1/reviews
///
/// Every review, optionally filtered by `status`. HR / Admin only.
pub async fn list_reviews(
    RequireHr(_user): RequireHr,
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> AppResult<impl IntoResponse> {
    let statuses = params
        .status
        .as_deref()
        .map(ReviewStatus::from_str_db)
        .transpose()?
        .map(|s| vec![s.as_str().to_string()]);

    let filter = ReviewFilter {
        statuses,
        ..Default::default()
    };
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let reviews = ReviewRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/mine
pub async fn list_my_active(
    Acting(actor): Acting,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reviews = list_own(&state, &actor, |employee_id| ReviewFilter {
        employee_id: Some(employee_id),
        statuses: statuses(ACTIVE_STATUSES),
        ..Default::default()
    })
    .await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/mine/history
pub async fn list_my_history(
    Acting(actor): Acting,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reviews = list_own(&state, &actor, |employee_id| ReviewFilter {
        employee_id: Some(employee_id),
        statuses: statuses(TERMINAL_STATUSES),
        ..Default::default()
    })
    .await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/team
///
/// Every review the caller manages, in any status.
pub async fn list_team(
    Acting(actor): Acting,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reviews = list_own(&state, &actor, |employee_id| ReviewFilter {
        manager_id: Some(employee_id),
        ..Default::default()
    })
    .await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/pending
///
/// Reviews waiting on the caller's manager review.
pub async fn list_pending(
    Acting(actor): Acting,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reviews = list_own(&state, &actor, |employee_id| ReviewFilter {
        manager_id: Some(employee_id),
        statuses: statuses(&[STATUS_MANAGER_REVIEW]),
        ..Default::default()
    })
    .await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/discussions/upcoming
///
/// HR / Admin see every manager's discussions; managers see their own.
pub async fn list_upcoming_discussions(
    Acting(actor): Acting,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let manager_id = if actor.has_org_wide_access() {
        None
    } else if let Some(own_id) = actor.employee_id {
        Some(own_id)
    } else {
        return Ok(Json(DataResponse { data: Vec::new() }));
    };

    let reviews =
        ReviewRepo::list_upcoming_discussions(&state.pool, manager_id, Utc::now()).await?;
    Ok(Json(DataResponse { data: reviews }))
}

// ---------------------------------------------------------------------------
// Single review
// ---------------------------------------------------------------------------

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = service::get_review(&state.pool, id, &actor).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/reviews/{id}/submit-for-employee
pub async fn submit_for_employee_review(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let graph =
        service::submit_for_employee_review(&state.pool, &state.event_bus, id, &actor).await?;
    Ok(Json(DataResponse { data: graph }))
}

/// PUT /api/v1/reviews/{id}/self-assessment
///
/// Save the employee's draft without changing status.
pub async fn save_employee_draft(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EmployeeAssessment>,
) -> AppResult<impl IntoResponse> {
    let graph =
        service::save_employee_draft(&state.pool, &state.event_bus, id, &actor, &input).await?;
    Ok(Json(DataResponse { data: graph }))
}

/// POST /api/v1/reviews/{id}/self-assessment/submit
pub async fn submit_self_assessment(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EmployeeAssessment>,
) -> AppResult<impl IntoResponse> {
    let graph =
        service::submit_self_assessment(&state.pool, &state.event_bus, id, &actor, &input).await?;
    Ok(Json(DataResponse { data: graph }))
}

/// PUT /api/v1/reviews/{id}/manager-review
///
/// `action` selects save, schedule_discussion or finalize.
pub async fn manager_review(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ManagerReview>,
) -> AppResult<impl IntoResponse> {
    let graph = service::manager_review(&state.pool, &state.event_bus, id, &actor, &input).await?;
    Ok(Json(DataResponse { data: graph }))
}

/// POST /api/v1/reviews/{id}/discussion
pub async fn schedule_discussion(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(slot): Json<DiscussionSlot>,
) -> AppResult<impl IntoResponse> {
    let graph =
        service::schedule_discussion(&state.pool, &state.event_bus, id, &actor, &slot).await?;
    Ok(Json(DataResponse { data: graph }))
}

async fn sign_as(
    state: &AppState,
    actor: &ActingUser,
    id: DbId,
    party: SignatureParty,
    input: SignRequest,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let graph = service::sign(
        &state.pool,
        &state.event_bus,
        id,
        actor,
        party,
        input.signature.trim(),
    )
    .await?;
    Ok(Json(DataResponse { data: graph }))
}

/// POST /api/v1/reviews/{id}/sign/employee
pub async fn sign_as_employee(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SignRequest>,
) -> AppResult<impl IntoResponse> {
    sign_as(&state, &actor, id, SignatureParty::Employee, input).await
}

/// POST /api/v1/reviews/{id}/sign/manager
pub async fn sign_as_manager(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SignRequest>,
) -> AppResult<impl IntoResponse> {
    sign_as(&state, &actor, id, SignatureParty::Manager, input).await
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// GET /api/v1/reviews/{id}/comments
pub async fn list_comments(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comments = service::list_comments(&state.pool, id, &actor).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/reviews/{id}/comments
pub async fn add_comment(
    Acting(actor): Acting,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateReviewComment>,
) -> AppResult<impl IntoResponse> {
    let comment = service::add_comment(&state.pool, id, &actor, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}
