use std::sync::Arc;

use m4db_core::directories::FileLayout;
use m4db_db::Registry;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub config: Arc<ServerConfig>,
    /// Canonical paths below the configured file root.
    pub layout: Arc<FileLayout>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, config: ServerConfig) -> Self {
        let layout = Arc::new(FileLayout::new(config.file_root.clone()));
        Self {
            registry,
            config: Arc::new(config),
            layout,
        }
    }
}
