use okr_core::error::CoreError;

/// Errors raised by lifecycle services.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
