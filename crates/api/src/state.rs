use std::sync::Arc;

use tea_service::TechniqueService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tea_db::DbPool,
    /// Server configuration (accessed by the auth extractor and handlers).
    pub config: Arc<ServerConfig>,
    /// The technique write pipeline.
    pub techniques: Arc<TechniqueService>,
}

impl AppState {
    pub fn new(pool: tea_db::DbPool, config: ServerConfig) -> Self {
        Self {
            techniques: Arc::new(TechniqueService::new(pool.clone())),
            pool,
            config: Arc::new(config),
        }
    }
}
