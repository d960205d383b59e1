//! Application state shared across all request handlers.

use kickoff_core::allocation::AllocationQueue;
use kickoff_core::config::{AuthConfig, MarketConfig};
use kickoff_core::framework::DatabaseProcessor;
use kickoff_core::pool::SquadPool;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Pending team allocations, drained by the allocator task.
    pub queue: Arc<AllocationQueue>,
    /// Pre-built squads and their cursor.
    pub pool: Arc<SquadPool>,
    /// Session token settings.
    pub auth: Arc<AuthConfig>,
    /// Transfer market settings.
    pub market: MarketConfig,
}

impl AppState {
    pub fn new(
        db: PgPool,
        queue: Arc<AllocationQueue>,
        pool: Arc<SquadPool>,
        auth: AuthConfig,
        market: MarketConfig,
    ) -> Self {
        Self {
            db,
            queue,
            pool,
            auth: Arc::new(auth),
            market,
        }
    }

    /// Query executor over the shared pool.
    pub fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor::new(self.db.clone())
    }
}
