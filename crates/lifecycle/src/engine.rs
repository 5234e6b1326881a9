//! Pure review transitions.
//!
//! Each operation mutates a loaded [`ReviewContext`] in memory and returns
//! the notification events to publish once the graph is persisted. An
//! `Err` means the caller must discard the context without saving.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use okr_core::error::CoreError;
use okr_core::identity::ActingUser;
use okr_core::notification::{
    review_action_url, ENTITY_PERFORMANCE_REVIEW, NOTIFY_DISCUSSION_SCHEDULED,
    NOTIFY_REVIEW_FINALIZED, NOTIFY_REVIEW_READY, NOTIFY_REVIEW_SIGNED, NOTIFY_REVIEW_SUBMITTED,
};
use okr_core::rating::{ensure_fully_rated, validate_overall_rating};
use okr_core::review::{
    is_signed, next_status, resolve_discussion_slot, status_after_signing, ReviewEvent,
    ReviewStatus,
};
use okr_db::models::employee::Employee;
use okr_db::models::review::ReviewGraph;
use okr_events::NotificationEvent;
use serde::Deserialize;

use crate::access::{require_manager, require_manager_or_org_wide, require_subject};
use crate::rating::{
    apply_edits, freeze_final_ratings, manager_ratings, KeyResultEdit, RatingSlot,
};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Employee self-assessment, used both for drafts and for submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeAssessment {
    pub self_assessment: Option<String>,
    #[serde(default)]
    pub key_results: Vec<KeyResultEdit>,
}

/// What the manager wants to happen after saving their edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerAction {
    #[default]
    Save,
    ScheduleDiscussion,
    Finalize,
}

/// Manager review form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagerReview {
    pub manager_assessment: Option<String>,
    pub overall_rating: Option<f64>,
    pub discussion_notes: Option<String>,
    pub final_assessment: Option<String>,
    #[serde(default)]
    pub key_results: Vec<KeyResultEdit>,
    #[serde(default)]
    pub action: ManagerAction,
    /// Required when `action` is `schedule_discussion`.
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
}

/// Discussion slot request. Time defaults to 14:00.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionSlot {
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
}

/// Which party is signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureParty {
    Employee,
    Manager,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// A review graph together with both participants.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub graph: ReviewGraph,
    pub employee: Employee,
    pub manager: Employee,
}

impl ReviewContext {
    pub fn status(&self) -> Result<ReviewStatus, CoreError> {
        self.graph.review.status()
    }

    fn set_status(&mut self, status: ReviewStatus) {
        self.graph.review.status = status.as_str().to_string();
    }

    /// Build a notification about this review for one participant.
    ///
    /// Returns `None` when the participant has no linked identity user.
    fn notify(
        &self,
        recipient: &Employee,
        actor: &ActingUser,
        notification_type: &str,
        title: &str,
        message: String,
    ) -> Option<NotificationEvent> {
        let user_id = recipient.user_id?;
        let review_id = self.graph.review.id;
        Some(
            NotificationEvent::new(user_id, notification_type, title, message)
                .with_sender(actor.user_id)
                .with_action_url(review_action_url(review_id))
                .with_related(ENTITY_PERFORMANCE_REVIEW, review_id),
        )
    }
}

type Outcome = Result<Vec<NotificationEvent>, CoreError>;

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Draft -> Employee_Review. Manager, HR or Admin.
pub fn submit_for_employee_review(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    now: DateTime<Utc>,
) -> Outcome {
    require_manager_or_org_wide(&ctx.graph.review, actor)?;
    let to = next_status(ctx.status()?, ReviewEvent::SubmitForEmployeeReview)?;

    ctx.set_status(to);
    ctx.graph.review.submitted_at = Some(now);

    Ok(ctx
        .notify(
            &ctx.employee,
            actor,
            NOTIFY_REVIEW_READY,
            "Review ready for self-assessment",
            format!(
                "Your review for {} to {} is ready for your self-assessment.",
                ctx.graph.review.review_period_start, ctx.graph.review.review_period_end
            ),
        )
        .into_iter()
        .collect())
}

/// Store an in-progress self-assessment without changing status.
pub fn save_employee_draft(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    input: &EmployeeAssessment,
    now: DateTime<Utc>,
) -> Outcome {
    require_subject(&ctx.graph.review, actor)?;
    apply_employee_assessment(ctx, input, now)?;
    Ok(Vec::new())
}

/// Employee_Review -> Manager_Review, notifying the manager.
pub fn submit_self_assessment(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    input: &EmployeeAssessment,
    now: DateTime<Utc>,
) -> Outcome {
    require_subject(&ctx.graph.review, actor)?;
    let to = next_status(ctx.status()?, ReviewEvent::SubmitSelfAssessment)?;

    apply_employee_assessment(ctx, input, now)?;
    ctx.set_status(to);
    ctx.graph.review.employee_submitted_at = Some(now);

    Ok(ctx
        .notify(
            &ctx.manager,
            actor,
            NOTIFY_REVIEW_SUBMITTED,
            "Self-assessment submitted",
            format!(
                "{} has submitted their self-assessment.",
                ctx.employee.full_name()
            ),
        )
        .into_iter()
        .collect())
}

fn apply_employee_assessment(
    ctx: &mut ReviewContext,
    input: &EmployeeAssessment,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    let status = ctx.status()?;
    if !status.accepts_employee_edits() {
        return Err(CoreError::Validation(format!(
            "Employee ratings cannot be changed while the review is in status {status}"
        )));
    }
    apply_edits(&mut ctx.graph, RatingSlot::Employee, &input.key_results, now)?;
    if let Some(text) = &input.self_assessment {
        ctx.graph.review.self_assessment.clone_from(text);
    }
    Ok(())
}

/// Manager save, optionally followed by scheduling or finalizing.
///
/// Every check runs before the first field is written, so a rejected action
/// leaves the context exactly as loaded.
pub fn manager_review(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    input: &ManagerReview,
    now: DateTime<Utc>,
) -> Outcome {
    require_manager(&ctx.graph.review, actor)?;
    let status = ctx.status()?;
    if !status.accepts_manager_edits() {
        return Err(CoreError::Validation(format!(
            "Manager ratings cannot be changed while the review is in status {status}"
        )));
    }
    if let Some(rating) = input.overall_rating {
        validate_overall_rating(rating)?;
    }

    let slot = match input.action {
        ManagerAction::Save => None,
        ManagerAction::ScheduleDiscussion => {
            next_status(status, ReviewEvent::ScheduleDiscussion)?;
            let date = input.scheduled_date.ok_or_else(|| {
                CoreError::Validation("A discussion date is required".to_string())
            })?;
            Some(discussion_slot(date, input.scheduled_time, now)?)
        }
        ManagerAction::Finalize => {
            next_status(status, ReviewEvent::Finalize)?;
            None
        }
    };

    let mut staged = ctx.graph.clone();
    apply_edits(&mut staged, RatingSlot::Manager, &input.key_results, now)?;
    if input.action == ManagerAction::Finalize {
        ensure_fully_rated(manager_ratings(&staged))?;
    }
    ctx.graph = staged;

    let review = &mut ctx.graph.review;
    if let Some(text) = &input.manager_assessment {
        review.manager_assessment.clone_from(text);
    }
    if let Some(text) = &input.discussion_notes {
        review.discussion_notes.clone_from(text);
    }
    if let Some(text) = &input.final_assessment {
        review.final_assessment.clone_from(text);
    }
    if input.overall_rating.is_some() {
        review.overall_rating = input.overall_rating;
    }
    review.manager_reviewed_at = Some(now);

    match input.action {
        ManagerAction::Save => Ok(Vec::new()),
        ManagerAction::ScheduleDiscussion => match slot {
            Some(at) => Ok(enter_discussion(ctx, actor, at, now)),
            None => Err(CoreError::Internal("Discussion slot was not resolved".to_string())),
        },
        ManagerAction::Finalize => Ok(finalize(ctx, actor, now)),
    }
}

/// Manager_Review -> Discussion without rating edits.
///
/// Also moves the slot of a review already in Discussion. The employee is
/// notified each time.
pub fn schedule_discussion(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    slot: &DiscussionSlot,
    now: DateTime<Utc>,
) -> Outcome {
    require_manager(&ctx.graph.review, actor)?;
    next_status(ctx.status()?, ReviewEvent::ScheduleDiscussion)?;
    let at = discussion_slot(slot.scheduled_date, slot.scheduled_time, now)?;
    Ok(enter_discussion(ctx, actor, at, now))
}

fn discussion_slot(
    date: NaiveDate,
    time: Option<NaiveTime>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, CoreError> {
    let slot = resolve_discussion_slot(date, time, now.date_naive())?;
    Ok(Utc.from_utc_datetime(&slot))
}

fn enter_discussion(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<NotificationEvent> {
    ctx.set_status(ReviewStatus::Discussion);
    ctx.graph.review.scheduled_discussion_at = Some(at);
    ctx.graph.review.discussion_at = Some(now);

    ctx.notify(
        &ctx.employee,
        actor,
        NOTIFY_DISCUSSION_SCHEDULED,
        "Review discussion scheduled",
        format!(
            "{} scheduled your review discussion for {}.",
            ctx.manager.full_name(),
            at.format("%Y-%m-%d %H:%M")
        ),
    )
    .into_iter()
    .collect()
}

fn finalize(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    now: DateTime<Utc>,
) -> Vec<NotificationEvent> {
    freeze_final_ratings(&mut ctx.graph, now);
    ctx.set_status(ReviewStatus::Completed);
    ctx.graph.review.finalized_at = Some(now);
    if ctx.graph.review.final_assessment.is_empty() {
        let assessment = ctx.graph.review.manager_assessment.clone();
        ctx.graph.review.final_assessment = assessment;
    }

    ctx.notify(
        &ctx.employee,
        actor,
        NOTIFY_REVIEW_FINALIZED,
        "Review finalized",
        format!("{} has finalized your performance review.", ctx.manager.full_name()),
    )
    .into_iter()
    .collect()
}

/// Record one party's signature. Completes the review once both have signed.
pub fn sign(
    ctx: &mut ReviewContext,
    actor: &ActingUser,
    party: SignatureParty,
    signature: &str,
    now: DateTime<Utc>,
) -> Outcome {
    match party {
        SignatureParty::Employee => require_subject(&ctx.graph.review, actor)?,
        SignatureParty::Manager => require_manager(&ctx.graph.review, actor)?,
    }
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(CoreError::Validation("Signature cannot be empty".to_string()));
    }

    let review = &ctx.graph.review;
    let (own, other) = match party {
        SignatureParty::Employee => (&review.employee_signature, &review.manager_signature),
        SignatureParty::Manager => (&review.manager_signature, &review.employee_signature),
    };
    if is_signed(own.as_deref()) {
        return Err(CoreError::Validation("The review has already been signed".to_string()));
    }
    let to = status_after_signing(ctx.status()?, is_signed(other.as_deref()))?;

    let review = &mut ctx.graph.review;
    match party {
        SignatureParty::Employee => {
            review.employee_signature = Some(signature.to_string());
            review.employee_signed_at = Some(now);
        }
        SignatureParty::Manager => {
            review.manager_signature = Some(signature.to_string());
            review.manager_signed_at = Some(now);
        }
    }
    if to == ReviewStatus::Completed && review.finalized_at.is_none() {
        review.finalized_at = Some(now);
    }
    ctx.set_status(to);

    let (recipient, signer) = match party {
        SignatureParty::Employee => (&ctx.manager, &ctx.employee),
        SignatureParty::Manager => (&ctx.employee, &ctx.manager),
    };
    Ok(ctx
        .notify(
            recipient,
            actor,
            NOTIFY_REVIEW_SIGNED,
            "Review signed",
            format!("{} has signed the performance review.", signer.full_name()),
        )
        .into_iter()
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
