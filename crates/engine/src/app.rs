//! Application state and composition.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::ConnectionManager;
use crate::infrastructure::{
    fs_store::FsGameStore, http_store::HttpGameStore, ports::GameStore, settings::EngineSettings,
};
use crate::stores::{ModelRepository, SharedModel, SharedViews, ViewRepository};
use crate::use_cases::{DiagramBridge, GameOrchestrator};

/// Main application state.
///
/// Owns the two repositories and hands them to the orchestrator and the
/// bridge. Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub store: Arc<dyn GameStore>,
    pub model: SharedModel,
    pub views: SharedViews,
    pub connections: Arc<ConnectionManager>,
    pub game: Arc<GameOrchestrator>,
    pub bridge: Arc<DiagramBridge>,
}

impl App {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        let model: SharedModel = Arc::new(RwLock::new(ModelRepository::new()));
        let views: SharedViews = Arc::new(RwLock::new(ViewRepository::new()));
        let connections = Arc::new(ConnectionManager::new());

        let game = Arc::new(GameOrchestrator::new(
            store.clone(),
            model.clone(),
            views.clone(),
        ));
        let bridge = Arc::new(DiagramBridge::new(
            model.clone(),
            views.clone(),
            connections.clone(),
        ));

        Self {
            store,
            model,
            views,
            connections,
            game,
            bridge,
        }
    }

    /// The game store selected by the settings: remote if a store URL is
    /// configured, the maps directory otherwise.
    pub fn store_from_settings(settings: &EngineSettings) -> Arc<dyn GameStore> {
        match &settings.game_store_url {
            Some(url) => {
                tracing::info!(url = %url, "Using remote game store");
                Arc::new(HttpGameStore::new(url))
            }
            None => {
                tracing::info!(
                    maps_dir = %settings.maps_dir.display(),
                    soundfx_dir = %settings.soundfx_dir.display(),
                    "Using filesystem game store"
                );
                Arc::new(FsGameStore::new(
                    settings.maps_dir.clone(),
                    settings.soundfx_dir.clone(),
                ))
            }
        }
    }
}
