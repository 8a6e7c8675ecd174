//! Application state for the MySQL API.

use std::sync::Arc;

use common::config::AppConfig;

use crate::connection::ConnectionFactory;
use crate::service::{MySqlBackend, QueryBackend};

/// Application state shared across handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn QueryBackend>,
}

impl AppState {
    /// Creates state backed by the configured MySQL server.
    pub fn new(config: AppConfig) -> Self {
        let factory = ConnectionFactory::new(config.mysql.clone());
        Self::with_backend(config, Arc::new(MySqlBackend::new(factory)))
    }

    pub fn with_backend(config: AppConfig, backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}
