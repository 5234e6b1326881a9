use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use okr_core::error::CoreError;
use okr_lifecycle::LifecycleError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `okr_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A path or resource outside any domain entity, e.g. an unknown route.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Core(e) => AppError::Core(e),
            LifecycleError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {reason}")
            })
            .collect();
        fields.sort();
        AppError::Core(CoreError::Validation(fields.join("; ")))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Message shown for a violated constraint the API knows by name.
fn constraint_message(constraint: &str) -> Option<&'static str> {
    Some(match constraint {
        "uq_employees_email" => "An employee with this email already exists",
        "uq_employees_user_id" => "This user is already linked to another employee",
        "uq_employee_roles_name" => "A role with this name already exists",
        "uq_performance_reviews_active_employee" => "The employee already has an active review",
        "ck_employees_not_own_manager" => "An employee cannot be their own manager",
        "ck_performance_reviews_period" => "Review period start must be before its end",
        "ck_key_results_employee_rating"
        | "ck_key_results_manager_rating"
        | "ck_key_results_final_rating" => "Ratings must be between 1 and 5",
        _ => return None,
    })
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to 409.
/// - Foreign-key violations on `fk_*` constraints map to 409 (the row is
///   still referenced, or references something that does not exist).
/// - Check violations on `ck_*` constraints map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let internal = || {
        tracing::error!(error = %err, "Database error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred".to_string(),
        )
    };

    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        _ => return internal(),
    };

    let constraint = db_err.constraint().unwrap_or_default();
    let (status, code, fallback) = match (db_err.code().as_deref(), constraint) {
        // unique_violation
        (Some("23505"), c) if c.starts_with("uq_") => {
            (StatusCode::CONFLICT, "CONFLICT", "Duplicate value")
        }
        // foreign_key_violation
        (Some("23503"), c) if c.starts_with("fk_") => {
            (StatusCode::CONFLICT, "CONFLICT", "Referenced record conflict")
        }
        // check_violation
        (Some("23514"), c) if c.starts_with("ck_") => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Invalid value")
        }
        _ => return internal(),
    };

    let message = match constraint_message(constraint) {
        Some(message) => message.to_string(),
        None => format!("{fallback}: {constraint}"),
    };
    (status, code, message)
}
