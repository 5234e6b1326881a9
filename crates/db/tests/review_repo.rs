//! Integration tests for `ReviewRepo` against a real database.

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use okr_core::review::{ACTIVE_STATUSES, STATUS_COMPLETED, STATUS_DISCUSSION};
use okr_core::types::DbId;
use okr_db::models::employee::{CreateEmployee, Employee};
use okr_db::models::review::{NewKeyResult, NewObjective, NewReview, PerformanceReview};
use okr_db::repositories::review_repo::ReviewFilter;
use okr_db::repositories::{EmployeeRepo, ReviewRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn employee(pool: &PgPool, name: &str, manager_id: Option<DbId>) -> Employee {
    EmployeeRepo::create(
        pool,
        &CreateEmployee {
            user_id: None,
            first_name: name.to_string(),
            last_name: "Repo".to_string(),
            email: format!("{}@repo.test", name.to_lowercase()),
            role_name: None,
            role_id: None,
            position: None,
            line_of_business: None,
            manager_id,
        },
    )
    .await
    .unwrap()
}

fn key_result(name: &str, sort_order: i32) -> NewKeyResult {
    NewKeyResult {
        name: name.to_string(),
        target: String::new(),
        measure: String::new(),
        measurement_source: String::new(),
        weight: 50.0,
        sort_order,
        rating_descriptions: std::array::from_fn(|i| format!("band {}", i + 1)),
    }
}

fn structure() -> Vec<NewObjective> {
    vec![NewObjective {
        name: "Reliability".to_string(),
        description: String::new(),
        weight: 100.0,
        sort_order: 0,
        key_results: vec![key_result("Uptime", 0), key_result("Incidents", 1)],
    }]
}

fn period() -> (NaiveDate, NaiveDate) {
    let end = Utc::now().date_naive();
    (end - Duration::days(180), end)
}

async fn new_review(pool: &PgPool, employee_id: DbId, manager_id: DbId) -> PerformanceReview {
    let (start, end) = period();
    ReviewRepo::create_graph(
        pool,
        &NewReview {
            employee_id,
            manager_id,
            template_id: None,
            review_period_start: start,
            review_period_end: end,
        },
        &structure(),
    )
    .await
    .unwrap()
}

async fn set_status(pool: &PgPool, review_id: DbId, status: &str) {
    sqlx::query("UPDATE performance_reviews SET status = $2 WHERE id = $1")
        .bind(review_id)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_graph_copies_structure_in_order(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let report = employee(&pool, "Emery", Some(manager.id)).await;

    let review = new_review(&pool, report.id, manager.id).await;
    assert_eq!(review.status, "Draft");
    assert_eq!(review.version, 1);

    let graph = ReviewRepo::load_graph(&pool, review.id).await.unwrap().unwrap();
    assert_eq!(graph.objectives.len(), 1);
    let krs = &graph.objectives[0].key_results;
    assert_eq!(krs.len(), 2);
    assert_eq!(krs[0].name, "Uptime");
    assert_eq!(krs[1].name, "Incidents");
    assert_eq!(krs[0].rating_5_description, "band 5");
    assert!(krs.iter().all(|kr| kr.employee_rating.is_none()));

    assert!(ReviewRepo::has_active_review(&pool, report.id).await.unwrap());
    assert!(!ReviewRepo::has_active_review(&pool, manager.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn database_enforces_one_active_review(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let report = employee(&pool, "Emery", Some(manager.id)).await;
    let first = new_review(&pool, report.id, manager.id).await;

    let (start, end) = period();
    let second = ReviewRepo::create_graph(
        &pool,
        &NewReview {
            employee_id: report.id,
            manager_id: manager.id,
            template_id: None,
            review_period_start: start,
            review_period_end: end,
        },
        &structure(),
    )
    .await;
    assert_matches!(
        second,
        Err(sqlx::Error::Database(e))
            if e.constraint() == Some("uq_performance_reviews_active_employee")
    );

    // Once the first review is terminal a new one is allowed.
    set_status(&pool, first.id, STATUS_COMPLETED).await;
    new_review(&pool, report.id, manager.id).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_graph_writes_ratings_and_bumps_version(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let report = employee(&pool, "Emery", Some(manager.id)).await;
    let review = new_review(&pool, report.id, manager.id).await;

    let mut graph = ReviewRepo::load_graph(&pool, review.id).await.unwrap().unwrap();
    graph.review.status = "Employee_Review".to_string();
    graph.review.self_assessment = "Good half".to_string();
    let kr_id = graph.objectives[0].key_results[0].id;
    let kr = graph.key_result_mut(kr_id).unwrap();
    kr.employee_rating = Some(4);
    kr.employee_comments = "Steady".to_string();

    let saved = ReviewRepo::save_graph(&pool, &graph).await.unwrap().unwrap();
    assert_eq!(saved.version, review.version + 1);
    assert_eq!(saved.status, "Employee_Review");

    let reloaded = ReviewRepo::load_graph(&pool, review.id).await.unwrap().unwrap();
    assert_eq!(reloaded.review.self_assessment, "Good half");
    assert_eq!(reloaded.objectives[0].key_results[0].employee_rating, Some(4));
    assert_eq!(reloaded.objectives[0].key_results[0].employee_comments, "Steady");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_save_writes_nothing(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let report = employee(&pool, "Emery", Some(manager.id)).await;
    let review = new_review(&pool, report.id, manager.id).await;

    let mut first = ReviewRepo::load_graph(&pool, review.id).await.unwrap().unwrap();
    let mut second = first.clone();

    first.review.self_assessment = "first writer".to_string();
    assert!(ReviewRepo::save_graph(&pool, &first).await.unwrap().is_some());

    second.review.self_assessment = "second writer".to_string();
    second.objectives[0].key_results[0].employee_rating = Some(1);
    assert!(ReviewRepo::save_graph(&pool, &second).await.unwrap().is_none());

    let reloaded = ReviewRepo::load_graph(&pool, review.id).await.unwrap().unwrap();
    assert_eq!(reloaded.review.self_assessment, "first writer");
    assert_eq!(reloaded.objectives[0].key_results[0].employee_rating, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_check_constraint_rejects_out_of_range(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let report = employee(&pool, "Emery", Some(manager.id)).await;
    let review = new_review(&pool, report.id, manager.id).await;

    let mut graph = ReviewRepo::load_graph(&pool, review.id).await.unwrap().unwrap();
    graph.objectives[0].key_results[0].manager_rating = Some(6);

    let result = ReviewRepo::save_graph(&pool, &graph).await;
    assert_matches!(
        result,
        Err(sqlx::Error::Database(e)) if e.constraint() == Some("ck_key_results_manager_rating")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_participant_and_status(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let a = employee(&pool, "Avery", Some(manager.id)).await;
    let b = employee(&pool, "Blake", Some(manager.id)).await;
    let done = new_review(&pool, a.id, manager.id).await;
    set_status(&pool, done.id, STATUS_COMPLETED).await;
    new_review(&pool, b.id, manager.id).await;

    let team = ReviewFilter {
        manager_id: Some(manager.id),
        ..Default::default()
    };
    let all = ReviewRepo::list(&pool, &team, 50, 0).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].manager_name, "Morgan Repo");

    let active = ReviewFilter {
        manager_id: Some(manager.id),
        statuses: Some(ACTIVE_STATUSES.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    };
    let rows = ReviewRepo::list(&pool, &active, 50, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].employee_id, b.id);
    assert_eq!(rows[0].employee_name, "Blake Repo");

    let mine = ReviewFilter {
        employee_id: Some(a.id),
        ..Default::default()
    };
    let rows = ReviewRepo::list(&pool, &mine, 50, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, STATUS_COMPLETED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upcoming_discussions_skip_past_slots(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let other = employee(&pool, "Quinn", None).await;
    let a = employee(&pool, "Avery", Some(manager.id)).await;
    let b = employee(&pool, "Blake", Some(manager.id)).await;
    let c = employee(&pool, "Casey", Some(other.id)).await;

    let now = Utc::now();
    for (emp, mgr, offset) in [(a.id, manager.id, 2), (b.id, manager.id, -2), (c.id, other.id, 1)] {
        let review = new_review(&pool, emp, mgr).await;
        sqlx::query(
            "UPDATE performance_reviews SET status = $2, scheduled_discussion_at = $3 WHERE id = $1",
        )
        .bind(review.id)
        .bind(STATUS_DISCUSSION)
        .bind(now + Duration::days(offset))
        .execute(&pool)
        .await
        .unwrap();
    }

    let mine = ReviewRepo::list_upcoming_discussions(&pool, Some(manager.id), now)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].employee_id, a.id);

    let everyone = ReviewRepo::list_upcoming_discussions(&pool, None, now).await.unwrap();
    assert_eq!(everyone.len(), 2);
    assert_eq!(everyone[0].employee_id, c.id, "soonest first");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_review_cascades_to_graph(pool: PgPool) {
    let manager = employee(&pool, "Morgan", None).await;
    let report = employee(&pool, "Emery", Some(manager.id)).await;
    let review = new_review(&pool, report.id, manager.id).await;

    sqlx::query("DELETE FROM performance_reviews WHERE id = $1")
        .bind(review.id)
        .execute(&pool)
        .await
        .unwrap();

    let (krs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM key_results")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(krs, 0);
}
