//! Creating reviews from templates.
//!
//! A template tree is cloned into fresh [`NewObjective`] values so review and
//! template never share rows. Batch assignment processes each employee
//! independently: an employee who already has an active review is skipped
//! and reported, never rolled back with the rest of the batch.

use std::collections::HashMap;

use chrono::NaiveDate;
use okr_core::error::CoreError;
use okr_core::identity::ActingUser;
use okr_core::notification::{
    review_action_url, ENTITY_PERFORMANCE_REVIEW, NOTIFY_OKR_ASSIGNED,
    NOTIFY_OKR_ASSIGNED_MANAGER, NOTIFY_REVIEW_CREATION_FAILED, NOTIFY_REVIEW_CREATION_PARTIAL,
};
use okr_core::review::validate_review_period;
use okr_core::types::DbId;
use okr_db::models::employee::Employee;
use okr_db::models::review::{NewKeyResult, NewObjective, NewReview};
use okr_db::models::template::TemplateTree;
use okr_db::repositories::{EmployeeRepo, ReviewRepo, TemplateRepo};
use okr_events::{EventBus, NotificationEvent};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::LifecycleResult;

/// Partial unique index that backs the one-active-review rule.
const ACTIVE_REVIEW_INDEX: &str = "uq_performance_reviews_active_employee";

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

/// Assign reviews to one or more employees.
///
/// Without `template_id` each employee gets the active template for their
/// job role. Without `manager_id` the employee's own manager is used, then
/// the acting user's employee record.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignReviews {
    pub template_id: Option<DbId>,
    pub employee_ids: Vec<DbId>,
    pub manager_id: Option<DbId>,
    pub review_period_start: NaiveDate,
    pub review_period_end: NaiveDate,
}

/// Why an employee was left out of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ActiveReviewExists,
    NoActiveTemplate,
    NoManager,
    InactiveManager,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::ActiveReviewExists => "already has an active review",
            Self::NoActiveTemplate => "no active template for their role",
            Self::NoManager => "no manager to assign",
            Self::InactiveManager => "their manager is no longer active",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedReview {
    pub review_id: DbId,
    pub employee_id: DbId,
    pub employee_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEmployee {
    pub employee_id: DbId,
    pub employee_name: String,
    pub reason: SkipReason,
}

/// Outcome of an assignment batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstantiationReport {
    pub created_count: usize,
    pub skipped_count: usize,
    pub created: Vec<CreatedReview>,
    pub skipped: Vec<SkippedEmployee>,
}

impl InstantiationReport {
    fn record_created(&mut self, employee: &Employee, review_id: DbId) {
        self.created.push(CreatedReview {
            review_id,
            employee_id: employee.id,
            employee_name: employee.full_name(),
        });
        self.created_count = self.created.len();
    }

    fn record_skipped(&mut self, employee: &Employee, reason: SkipReason) {
        tracing::info!(
            employee_id = employee.id,
            reason = reason.describe(),
            "Skipping review creation"
        );
        self.skipped.push(SkippedEmployee {
            employee_id: employee.id,
            employee_name: employee.full_name(),
            reason,
        });
        self.skipped_count = self.skipped.len();
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Deep-copy a template tree into new review objectives, in sort order.
pub fn clone_template(tree: &TemplateTree) -> Vec<NewObjective> {
    let mut objectives: Vec<_> = tree.objectives.iter().collect();
    objectives.sort_by_key(|o| (o.objective.sort_order, o.objective.id));

    objectives
        .into_iter()
        .map(|node| {
            let mut key_results: Vec<_> = node.key_results.iter().collect();
            key_results.sort_by_key(|kr| (kr.sort_order, kr.id));

            NewObjective {
                name: node.objective.name.clone(),
                description: node.objective.description.clone(),
                weight: node.objective.weight,
                sort_order: node.objective.sort_order,
                key_results: key_results
                    .into_iter()
                    .map(|kr| NewKeyResult {
                        name: kr.name.clone(),
                        target: kr.target.clone(),
                        measure: kr.measure.clone(),
                        measurement_source: kr.measurement_source.clone(),
                        weight: kr.weight,
                        sort_order: kr.sort_order,
                        rating_descriptions: kr.rating_bands().map(String::from),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Pick the manager for a new review.
///
/// Returns `None` when no candidate exists or the only candidate is the
/// employee themself.
pub fn resolve_manager(
    requested: Option<DbId>,
    employee: &Employee,
    actor: &ActingUser,
) -> Option<DbId> {
    requested
        .or(employee.manager_id)
        .or(actor.employee_id)
        .filter(|&id| id != employee.id)
}

/// Notifications for a freshly created review.
///
/// The manager is only told when someone else assigned the review.
pub fn assignment_notifications(
    review_id: DbId,
    employee: &Employee,
    manager: &Employee,
    actor: &ActingUser,
    period: (NaiveDate, NaiveDate),
) -> Vec<NotificationEvent> {
    let (start, end) = period;
    let about = |event: NotificationEvent| {
        event
            .with_sender(actor.user_id)
            .with_action_url(review_action_url(review_id))
            .with_related(ENTITY_PERFORMANCE_REVIEW, review_id)
    };

    let mut events = Vec::new();
    if let Some(user_id) = employee.user_id {
        events.push(about(NotificationEvent::new(
            user_id,
            NOTIFY_OKR_ASSIGNED,
            "New OKRs assigned",
            format!("You have been assigned OKRs for the review period {start} to {end}."),
        )));
    }
    if !actor.is_employee(manager.id) {
        if let Some(user_id) = manager.user_id {
            events.push(about(NotificationEvent::new(
                user_id,
                NOTIFY_OKR_ASSIGNED_MANAGER,
                "OKRs assigned to your report",
                format!(
                    "OKRs have been assigned to {} for the review period {start} to {end}.",
                    employee.full_name()
                ),
            )));
        }
    }
    events
}

/// Summary for the acting user when some or all employees were skipped.
pub fn summary_notification(
    report: &InstantiationReport,
    actor: &ActingUser,
) -> Option<NotificationEvent> {
    if report.skipped.is_empty() {
        return None;
    }
    let names = report
        .skipped
        .iter()
        .map(|s| format!("{} ({})", s.employee_name, s.reason.describe()))
        .collect::<Vec<_>>()
        .join(", ");

    let (kind, title) = if report.created.is_empty() {
        (NOTIFY_REVIEW_CREATION_FAILED, "Review creation failed")
    } else {
        (NOTIFY_REVIEW_CREATION_PARTIAL, "Review creation partially completed")
    };
    let message = format!(
        "Created {} review(s), skipped {}: {names}.",
        report.created.len(),
        report.skipped.len()
    );
    Some(NotificationEvent::new(actor.user_id, kind, title, message))
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Validate the request up front, then create one review per employee.
///
/// Missing employees, templates or permissions abort the whole batch before
/// anything is written. Per-employee conflicts are reported as skips.
pub async fn assign_reviews(
    pool: &PgPool,
    bus: &EventBus,
    actor: &ActingUser,
    request: &AssignReviews,
) -> LifecycleResult<InstantiationReport> {
    validate_review_period(request.review_period_start, request.review_period_end)?;
    if !actor.has_org_wide_access() && !actor.is_manager() {
        return Err(CoreError::Forbidden(
            "Only managers, HR or administrators can create reviews".to_string(),
        )
        .into());
    }

    let mut ids = request.employee_ids.clone();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err(CoreError::Validation("Select at least one employee".to_string()).into());
    }

    let explicit_template = match request.template_id {
        Some(id) => Some(load_active_template(pool, id).await?),
        None => None,
    };

    let employees = load_employees(pool, &ids).await?;
    authorize_targets(actor, &employees, request.manager_id)?;

    let mut managers: HashMap<DbId, Employee> = HashMap::new();
    if let Some(id) = request.manager_id {
        let manager = EmployeeRepo::find_by_id(pool, id)
            .await?
            .filter(|m| m.is_active)
            .ok_or(CoreError::NotFound { entity: "Employee", id })?;
        managers.insert(id, manager);
    }

    let mut role_templates: HashMap<DbId, Option<TemplateTree>> = HashMap::new();
    let mut report = InstantiationReport::default();
    let period = (request.review_period_start, request.review_period_end);

    for employee in &employees {
        let Some(manager_id) = resolve_manager(request.manager_id, employee, actor) else {
            report.record_skipped(employee, SkipReason::NoManager);
            continue;
        };

        if !managers.contains_key(&manager_id) {
            if let Some(manager) = EmployeeRepo::find_by_id(pool, manager_id).await? {
                managers.insert(manager_id, manager);
            }
        }
        let Some(manager) = managers.get(&manager_id).filter(|m| m.is_active) else {
            report.record_skipped(employee, SkipReason::InactiveManager);
            continue;
        };

        let template = match &explicit_template {
            Some(tree) => Some(tree.clone()),
            None => template_for_role(pool, &mut role_templates, employee).await?,
        };
        let Some(template) = template else {
            report.record_skipped(employee, SkipReason::NoActiveTemplate);
            continue;
        };

        if ReviewRepo::has_active_review(pool, employee.id).await? {
            report.record_skipped(employee, SkipReason::ActiveReviewExists);
            continue;
        }

        let new_review = NewReview {
            employee_id: employee.id,
            manager_id,
            template_id: Some(template.template.id),
            review_period_start: request.review_period_start,
            review_period_end: request.review_period_end,
        };
        let created =
            match ReviewRepo::create_graph(pool, &new_review, &clone_template(&template)).await {
                Ok(review) => review,
                Err(sqlx::Error::Database(e)) if e.constraint() == Some(ACTIVE_REVIEW_INDEX) => {
                    report.record_skipped(employee, SkipReason::ActiveReviewExists);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

        tracing::info!(
            review_id = created.id,
            employee_id = employee.id,
            manager_id,
            template_id = template.template.id,
            user_id = actor.user_id,
            "Review created"
        );
        report.record_created(employee, created.id);
        bus.publish_all(assignment_notifications(
            created.id, employee, manager, actor, period,
        ));
    }

    if let Some(summary) = summary_notification(&report, actor) {
        bus.publish(summary);
    }
    tracing::info!(
        created = report.created_count,
        skipped = report.skipped_count,
        user_id = actor.user_id,
        "Review assignment finished"
    );
    Ok(report)
}

async fn load_active_template(pool: &PgPool, id: DbId) -> LifecycleResult<TemplateTree> {
    let tree = TemplateRepo::load_tree(pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "OkrTemplate", id })?;
    if !tree.template.is_active {
        return Err(CoreError::Validation(format!(
            "Template '{}' is not active",
            tree.template.name
        ))
        .into());
    }
    Ok(tree)
}

/// Fetch every requested employee, failing on the first missing or inactive id.
async fn load_employees(pool: &PgPool, ids: &[DbId]) -> LifecycleResult<Vec<Employee>> {
    let employees = EmployeeRepo::find_many(pool, ids).await?;
    for &id in ids {
        if !employees.iter().any(|e| e.id == id && e.is_active) {
            return Err(CoreError::NotFound { entity: "Employee", id }.into());
        }
    }
    Ok(employees)
}

/// Managers may only target their own direct reports and name themselves.
fn authorize_targets(
    actor: &ActingUser,
    employees: &[Employee],
    manager_id: Option<DbId>,
) -> Result<(), CoreError> {
    if actor.has_org_wide_access() {
        return Ok(());
    }
    let Some(own_id) = actor.employee_id else {
        return Err(CoreError::Forbidden(
            "Your account is not linked to an employee record".to_string(),
        ));
    };
    if let Some(outsider) = employees.iter().find(|e| e.manager_id != Some(own_id)) {
        return Err(CoreError::Forbidden(format!(
            "{} is not one of your direct reports",
            outsider.full_name()
        )));
    }
    if manager_id.is_some_and(|id| id != own_id) {
        return Err(CoreError::Forbidden(
            "Managers can only assign reviews to themselves".to_string(),
        ));
    }
    Ok(())
}

async fn template_for_role(
    pool: &PgPool,
    cache: &mut HashMap<DbId, Option<TemplateTree>>,
    employee: &Employee,
) -> LifecycleResult<Option<TemplateTree>> {
    let Some(role_id) = employee.role_id else {
        return Ok(None);
    };
    if let Some(cached) = cache.get(&role_id) {
        return Ok(cached.clone());
    }
    let tree = match TemplateRepo::find_active_for_role(pool, role_id).await? {
        Some(template) => TemplateRepo::load_tree(pool, template.id).await?,
        None => None,
    };
    cache.insert(role_id, tree.clone());
    Ok(tree)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
