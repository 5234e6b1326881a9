use std::sync::Arc;

use okr_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and everything else is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: okr_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Notification events emitted by lifecycle operations.
    pub event_bus: Arc<EventBus>,
}
