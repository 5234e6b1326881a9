//! Async lifecycle operations: load the review graph, apply a pure
//! transition, persist once, then publish notifications.

use chrono::{DateTime, Utc};
use okr_core::comment::{validate_comment_text, CommentType};
use okr_core::error::CoreError;
use okr_core::identity::ActingUser;
use okr_core::types::DbId;
use okr_db::models::employee::Employee;
use okr_db::models::review::{CreateReviewComment, ReviewComment, ReviewGraph};
use okr_db::repositories::{EmployeeRepo, ReviewCommentRepo, ReviewRepo};
use okr_events::{EventBus, NotificationEvent};
use serde::Serialize;
use sqlx::PgPool;

use crate::access::{require_comment_permission, require_visible, Relationship};
use crate::engine::{
    self, DiscussionSlot, EmployeeAssessment, ManagerReview, ReviewContext, SignatureParty,
};
use crate::error::LifecycleResult;

/// A review graph with participant names and comments, for detail views.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetail {
    #[serde(flatten)]
    pub graph: ReviewGraph,
    pub employee_name: String,
    pub manager_name: String,
    pub comments: Vec<ReviewComment>,
    /// How the caller relates to the review.
    pub viewer: Relationship,
}

async fn participant(pool: &PgPool, id: DbId) -> LifecycleResult<Employee> {
    EmployeeRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Employee", id }.into())
}

/// Load a review graph and its participants, hiding it from unrelated callers.
pub async fn load_context(
    pool: &PgPool,
    review_id: DbId,
    actor: &ActingUser,
) -> LifecycleResult<ReviewContext> {
    let graph = ReviewRepo::load_graph(pool, review_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PerformanceReview",
            id: review_id,
        })?;
    require_visible(&graph.review, actor)?;

    let employee = participant(pool, graph.review.employee_id).await?;
    let manager = participant(pool, graph.review.manager_id).await?;
    Ok(ReviewContext {
        graph,
        employee,
        manager,
    })
}

/// Run one transition as a single unit of work.
///
/// A stale `version` on save surfaces as `Conflict` and nothing is written.
async fn execute<F>(
    pool: &PgPool,
    bus: &EventBus,
    review_id: DbId,
    actor: &ActingUser,
    transition: F,
) -> LifecycleResult<ReviewGraph>
where
    F: FnOnce(&mut ReviewContext, DateTime<Utc>) -> Result<Vec<NotificationEvent>, CoreError>,
{
    let mut ctx = load_context(pool, review_id, actor).await?;
    let from = ctx.graph.review.status.clone();

    let events = transition(&mut ctx, Utc::now())?;

    let saved = ReviewRepo::save_graph(pool, &ctx.graph)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(
                "The review was modified by another user. Reload it and try again.".to_string(),
            )
        })?;

    tracing::info!(
        review_id,
        user_id = actor.user_id,
        from = %from,
        to = %saved.status,
        notifications = events.len(),
        "Review updated"
    );

    ctx.graph.review = saved;
    bus.publish_all(events);
    Ok(ctx.graph)
}

/// Review graph with comments, visible to participants and HR / Admin.
pub async fn get_review(
    pool: &PgPool,
    review_id: DbId,
    actor: &ActingUser,
) -> LifecycleResult<ReviewDetail> {
    let ctx = load_context(pool, review_id, actor).await?;
    let viewer = require_visible(&ctx.graph.review, actor)?;
    let comments = ReviewCommentRepo::list_for_review(pool, review_id).await?;
    Ok(ReviewDetail {
        viewer,
        employee_name: ctx.employee.full_name(),
        manager_name: ctx.manager.full_name(),
        graph: ctx.graph,
        comments,
    })
}

pub async fn submit_for_employee_review(
    pool: &PgPool,
    bus: &EventBus,
    review_id: DbId,
    actor: &ActingUser,
) -> LifecycleResult<ReviewGraph> {
    execute(pool, bus, review_id, actor, |ctx, now| {
        engine::submit_for_employee_review(ctx, actor, now)
    })
    .await
}

pub async fn save_employee_draft(
    pool: &PgPool,
    bus: &EventBus,
    review_id: DbId,
    actor: &ActingUser,
    input: &EmployeeAssessment,
) -> LifecycleResult<ReviewGraph> {
    execute(pool, bus, review_id, actor, |ctx, now| {
        engine::save_employee_draft(ctx, actor, input, now)
    })
    .await
}

pub async fn submit_self_assessment(
    pool: &PgPool,
    bus: &EventBus,
    review_id: DbId,
    actor: &ActingUser,
    input: &EmployeeAssessment,
) -> LifecycleResult<ReviewGraph> {
    execute(pool, bus, review_id, actor, |ctx, now| {
        engine::submit_self_assessment(ctx, actor, input, now)
    })
    .await
}

pub async fn manager_review(
    pool: &PgPool,
    bus: &EventBus,
    review_id: DbId,
    actor: &ActingUser,
    input: &ManagerReview,
) -> LifecycleResult<ReviewGraph> {
    execute(pool, bus, review_id, actor, |ctx, now| {
        engine::manager_review(ctx, actor, input, now)
    })
    .await
}

pub async fn schedule_discussion(
    pool: &PgPool,
    bus: &EventBus,
    review_id: DbId,
    actor: &ActingUser,
    slot: &DiscussionSlot,
) -> LifecycleResult<ReviewGraph> {
    execute(pool, bus, review_id, actor, |ctx, now| {
        engine::schedule_discussion(ctx, actor, slot, now)
    })
    .await
}

pub async fn sign(
    pool: &PgPool,
    bus: &EventBus,
    review_id: DbId,
    actor: &ActingUser,
    party: SignatureParty,
    signature: &str,
) -> LifecycleResult<ReviewGraph> {
    execute(pool, bus, review_id, actor, |ctx, now| {
        engine::sign(ctx, actor, party, signature, now)
    })
    .await
}

/// Post a typed comment. Comments do not touch the review row.
pub async fn add_comment(
    pool: &PgPool,
    review_id: DbId,
    actor: &ActingUser,
    input: &CreateReviewComment,
) -> LifecycleResult<ReviewComment> {
    let comment_type = CommentType::from_str_db(&input.comment_type)?;
    validate_comment_text(&input.body)?;

    let review = ReviewRepo::find_by_id(pool, review_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PerformanceReview",
            id: review_id,
        })?;
    require_comment_permission(&review, actor, comment_type)?;

    let comment = ReviewCommentRepo::create(
        pool,
        review_id,
        actor.user_id,
        comment_type.as_str(),
        input.body.trim(),
    )
    .await?;
    tracing::debug!(
        review_id,
        comment_id = comment.id,
        comment_type = comment_type.as_str(),
        "Comment added"
    );
    Ok(comment)
}

pub async fn list_comments(
    pool: &PgPool,
    review_id: DbId,
    actor: &ActingUser,
) -> LifecycleResult<Vec<ReviewComment>> {
    let review = ReviewRepo::find_by_id(pool, review_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PerformanceReview",
            id: review_id,
        })?;
    require_visible(&review, actor)?;
    Ok(ReviewCommentRepo::list_for_review(pool, review_id).await?)
}
