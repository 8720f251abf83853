use sqlx::SqlitePool;
use std::sync::Arc;

use crate::target::TargetResolver;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub resolver: Arc<dyn TargetResolver>,
}

impl AppState {
    pub fn new(pool: SqlitePool, resolver: impl TargetResolver + 'static) -> Self {
        Self {
            pool,
            resolver: Arc::new(resolver),
        }
    }
}
