//! Performance review status machine.
//!
//! A review moves through `Draft -> Employee_Review -> Manager_Review ->
//! Discussion -> Completed`. `Signed` is a legacy terminal status that older
//! rows may carry; nothing transitions into it, but every query that looks
//! for finished reviews treats it as terminal alongside `Completed`.
//!
//! Signing is handled separately from the transition table because its
//! target depends on whether the other party has already signed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

pub const STATUS_DRAFT: &str = "Draft";
pub const STATUS_EMPLOYEE_REVIEW: &str = "Employee_Review";
pub const STATUS_MANAGER_REVIEW: &str = "Manager_Review";
pub const STATUS_DISCUSSION: &str = "Discussion";
pub const STATUS_COMPLETED: &str = "Completed";
pub const STATUS_SIGNED: &str = "Signed";

/// Every status string accepted by the database.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_EMPLOYEE_REVIEW,
    STATUS_MANAGER_REVIEW,
    STATUS_DISCUSSION,
    STATUS_COMPLETED,
    STATUS_SIGNED,
];

/// Statuses that count as an employee's in-flight review.
pub const ACTIVE_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_EMPLOYEE_REVIEW,
    STATUS_MANAGER_REVIEW,
    STATUS_DISCUSSION,
];

/// Statuses with no outgoing transitions.
pub const TERMINAL_STATUSES: &[&str] = &[STATUS_COMPLETED, STATUS_SIGNED];

/// Discussion time used when the manager picks only a date.
pub const DEFAULT_DISCUSSION_TIME: (u32, u32) = (14, 0);

/* --------------------------------------------------------------------------
ReviewStatus
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[serde(rename = "Draft")]
    Draft,
    #[serde(rename = "Employee_Review")]
    EmployeeReview,
    #[serde(rename = "Manager_Review")]
    ManagerReview,
    #[serde(rename = "Discussion")]
    Discussion,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Signed")]
    Signed,
}

impl ReviewStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_EMPLOYEE_REVIEW => Ok(Self::EmployeeReview),
            STATUS_MANAGER_REVIEW => Ok(Self::ManagerReview),
            STATUS_DISCUSSION => Ok(Self::Discussion),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_SIGNED => Ok(Self::Signed),
            _ => Err(CoreError::Validation(format!(
                "Invalid review status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::EmployeeReview => STATUS_EMPLOYEE_REVIEW,
            Self::ManagerReview => STATUS_MANAGER_REVIEW,
            Self::Discussion => STATUS_DISCUSSION,
            Self::Completed => STATUS_COMPLETED,
            Self::Signed => STATUS_SIGNED,
        }
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Signed)
    }

    /// The employee may edit self-assessment text and employee ratings.
    pub fn accepts_employee_edits(self) -> bool {
        matches!(self, Self::Draft | Self::EmployeeReview)
    }

    /// The manager may edit manager assessment, ratings and discussion notes.
    pub fn accepts_manager_edits(self) -> bool {
        matches!(self, Self::ManagerReview | Self::Discussion)
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --------------------------------------------------------------------------
Transition table
-------------------------------------------------------------------------- */

/// Events that move a review between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewEvent {
    /// Manager hands the draft to the employee.
    SubmitForEmployeeReview,
    /// Employee submits the self-assessment.
    SubmitSelfAssessment,
    /// Manager saves ratings without an action.
    SaveManagerReview,
    /// Manager confirms a discussion date.
    ScheduleDiscussion,
    /// Manager finalizes the review.
    Finalize,
}

impl ReviewEvent {
    pub fn label(self) -> &'static str {
        match self {
            Self::SubmitForEmployeeReview => "submit for employee review",
            Self::SubmitSelfAssessment => "submit self-assessment",
            Self::SaveManagerReview => "save manager review",
            Self::ScheduleDiscussion => "schedule discussion",
            Self::Finalize => "finalize",
        }
    }
}

use ReviewEvent as E;
use ReviewStatus as S;

const TRANSITIONS: &[(ReviewStatus, ReviewEvent, ReviewStatus)] = &[
    (S::Draft, E::SubmitForEmployeeReview, S::EmployeeReview),
    (S::EmployeeReview, E::SubmitSelfAssessment, S::ManagerReview),
    (S::ManagerReview, E::SaveManagerReview, S::ManagerReview),
    (S::Discussion, E::SaveManagerReview, S::Discussion),
    (S::ManagerReview, E::ScheduleDiscussion, S::Discussion),
    (S::Discussion, E::ScheduleDiscussion, S::Discussion),
    (S::ManagerReview, E::Finalize, S::Completed),
    (S::Discussion, E::Finalize, S::Completed),
];

/// Events accepted from the given status.
pub fn valid_events(from: ReviewStatus) -> Vec<ReviewEvent> {
    TRANSITIONS
        .iter()
        .filter(|(f, _, _)| *f == from)
        .map(|(_, e, _)| *e)
        .collect()
}

/// Resolve the status an event leads to, or reject it for the current status.
pub fn next_status(from: ReviewStatus, event: ReviewEvent) -> Result<ReviewStatus, CoreError> {
    TRANSITIONS
        .iter()
        .find(|(f, e, _)| *f == from && *e == event)
        .map(|(_, _, to)| *to)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Cannot {} a review in status {from}",
                event.label()
            ))
        })
}

/// Status after one party signs.
///
/// Signing is allowed on any non-terminal review. The review completes only
/// when the other party's signature is already present.
pub fn status_after_signing(
    current: ReviewStatus,
    other_party_signed: bool,
) -> Result<ReviewStatus, CoreError> {
    if current.is_terminal() {
        return Err(CoreError::Validation(format!(
            "Cannot sign a review in status {current}"
        )));
    }
    Ok(if other_party_signed {
        ReviewStatus::Completed
    } else {
        current
    })
}

/* --------------------------------------------------------------------------
Periods and scheduling
-------------------------------------------------------------------------- */

/// Validate that a review period starts before it ends.
pub fn validate_review_period(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::Validation(format!(
            "Review period start ({start}) must be before its end ({end})"
        )));
    }
    Ok(())
}

/// Combine a requested discussion date and optional time.
///
/// Dates before `today` are rejected. A missing time falls back to
/// [`DEFAULT_DISCUSSION_TIME`].
pub fn resolve_discussion_slot(
    date: NaiveDate,
    time: Option<NaiveTime>,
    today: NaiveDate,
) -> Result<NaiveDateTime, CoreError> {
    if date < today {
        return Err(CoreError::Validation(
            "Discussion date cannot be in the past".to_string(),
        ));
    }
    let (h, m) = DEFAULT_DISCUSSION_TIME;
    let time = time
        .or_else(|| NaiveTime::from_hms_opt(h, m, 0))
        .unwrap_or_default();
    Ok(date.and_time(time))
}

/// Whether a signature string counts as signed.
pub fn is_signed(signature: Option<&str>) -> bool {
    signature.is_some_and(|s| !s.trim().is_empty())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
