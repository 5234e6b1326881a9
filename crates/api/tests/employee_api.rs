//! HTTP-level tests for employee management and visibility.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_employee, delete_auth, get_auth, post_json_auth, put_json_auth, token,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn hr_creates_employee_with_validated_fields(pool: PgPool) {
    let hr = token(1, &["hr"]);

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "first_name": "Avery",
        "last_name": "Lane",
        "email": "avery.lane@example.com",
        "role_name": "Consultant",
        "position": "Consultant II"
    });
    let response = post_json_auth(app, "/api/v1/employees", body, &hr).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["first_name"], "Avery");
    assert_eq!(json["data"]["is_active"], true);

    let app = common::build_test_app(pool);
    let body = json!({ "first_name": "", "last_name": "Lane", "email": "not-an-email" });
    let response = post_json_auth(app, "/api/v1/employees", body, &hr).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("first_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    create_employee(&pool, 100, "Emery", None).await;
    let hr = token(1, &["hr"]);

    let app = common::build_test_app(pool);
    let body = json!({
        "first_name": "Other",
        "last_name": "Person",
        "email": "EMERY@example.com",
    });
    let response = post_json_auth(app, "/api/v1/employees", body, &hr).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "An employee with this email already exists");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn employees_cannot_create_employees(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "first_name": "A", "last_name": "B", "email": "a.b@example.com" });
    let response = post_json_auth(app, "/api/v1/employees", body, &token(5, &["employee"])).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_sees_only_direct_reports(pool: PgPool) {
    let manager = create_employee(&pool, 200, "Morgan", None).await;
    let report = create_employee(&pool, 100, "Emery", Some(manager.id)).await;
    let stranger = create_employee(&pool, 300, "Quinn", None).await;
    let manager_token = token(200, &["manager"]);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/employees", &manager_token).await).await;
    let listed = json["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], report.id);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/employees/{}", stranger.id);
    let response = get_auth(app, &uri, &manager_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/employees/me", &manager_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], manager.id);

    // Plain employees cannot list the directory.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/employees", &token(100, &["employee"])).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_reassignment_rejects_cycles(pool: PgPool) {
    let top = create_employee(&pool, 200, "Morgan", None).await;
    let middle = create_employee(&pool, 100, "Emery", Some(top.id)).await;
    let admin = token(1, &["admin"]);

    // Self-management.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/employees/{}", top.id),
        json!({ "manager_id": top.id }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Top reporting to their own report closes a loop.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/employees/{}", top.id),
        json!({ "manager_id": middle.id }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Clearing a manager is fine.
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/employees/{}", middle.id),
        json!({ "clear_manager": true }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["manager_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_cannot_reassign_reports(pool: PgPool) {
    let manager = create_employee(&pool, 200, "Morgan", None).await;
    let other = create_employee(&pool, 300, "Quinn", None).await;
    let report = create_employee(&pool, 100, "Emery", Some(manager.id)).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/employees/{}", report.id),
        json!({ "manager_id": other.id }),
        &token(200, &["manager"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Other fields are allowed.
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/employees/{}", report.id),
        json!({ "position": "Senior Consultant" }),
        &token(200, &["manager"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["position"], "Senior Consultant");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_employee_drops_out_of_lists(pool: PgPool) {
    let manager = create_employee(&pool, 200, "Morgan", None).await;
    let report = create_employee(&pool, 100, "Emery", Some(manager.id)).await;
    let hr = token(1, &["hr"]);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/employees/{}", report.id), &hr).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(
            app,
            &format!("/api/v1/employees/{}/direct-reports", manager.id),
            &hr,
        )
        .await,
    )
    .await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/employees", &hr).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/employees?include_inactive=true", &hr).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
