//! Caller relationships to a review.
//!
//! An unrelated caller gets `NotFound` so review ids do not leak. A related
//! caller acting outside their part of the workflow gets `Forbidden`.

use okr_core::comment::CommentType;
use okr_core::error::CoreError;
use okr_core::identity::ActingUser;
use okr_db::models::review::PerformanceReview;
use serde::Serialize;

/// How the acting user relates to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// The review's subject employee.
    Employee,
    /// The review's manager.
    Manager,
    /// HR or Admin with no direct part in the review.
    OrgWide,
}

/// Resolve the caller's relationship, preferring the most specific one.
pub fn relationship(review: &PerformanceReview, actor: &ActingUser) -> Option<Relationship> {
    if actor.is_employee(review.manager_id) {
        Some(Relationship::Manager)
    } else if actor.is_employee(review.employee_id) {
        Some(Relationship::Employee)
    } else if actor.has_org_wide_access() {
        Some(Relationship::OrgWide)
    } else {
        None
    }
}

/// Require any relationship to the review.
pub fn require_visible(
    review: &PerformanceReview,
    actor: &ActingUser,
) -> Result<Relationship, CoreError> {
    relationship(review, actor).ok_or(CoreError::NotFound {
        entity: "PerformanceReview",
        id: review.id,
    })
}

/// Require the caller to be the review's manager.
pub fn require_manager(review: &PerformanceReview, actor: &ActingUser) -> Result<(), CoreError> {
    require_visible(review, actor)?;
    if actor.is_employee(review.manager_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the review's manager can perform this action".to_string(),
        ))
    }
}

/// Require the caller to be the review's subject employee.
pub fn require_subject(review: &PerformanceReview, actor: &ActingUser) -> Result<(), CoreError> {
    require_visible(review, actor)?;
    if actor.is_employee(review.employee_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the reviewed employee can perform this action".to_string(),
        ))
    }
}

/// Require the review's manager or an HR / Admin user.
pub fn require_manager_or_org_wide(
    review: &PerformanceReview,
    actor: &ActingUser,
) -> Result<(), CoreError> {
    match require_visible(review, actor)? {
        Relationship::Manager | Relationship::OrgWide => Ok(()),
        Relationship::Employee => Err(CoreError::Forbidden(
            "Only the review's manager, HR or an administrator can perform this action"
                .to_string(),
        )),
    }
}

/// Check that the caller may post a comment of the given type.
///
/// Employee / Manager comments belong to that participant only. Once a
/// review is terminal only `Final` comments are accepted.
pub fn require_comment_permission(
    review: &PerformanceReview,
    actor: &ActingUser,
    comment_type: CommentType,
) -> Result<(), CoreError> {
    let relationship = require_visible(review, actor)?;

    let allowed = match comment_type {
        CommentType::Employee => relationship == Relationship::Employee,
        CommentType::Manager => relationship == Relationship::Manager,
        CommentType::Discussion | CommentType::Final => true,
    };
    if !allowed {
        return Err(CoreError::Forbidden(format!(
            "You cannot post {} comments on this review",
            comment_type.as_str()
        )));
    }

    let status = review.status()?;
    if status.is_terminal() && comment_type != CommentType::Final {
        return Err(CoreError::Validation(format!(
            "Only Final comments can be added to a review in status {status}"
        )));
    }
    Ok(())
}
