//! Persistence port for games.

use async_trait::async_trait;
use serde_json::Value;

use questforge_domain::{GameName, Model, View, ViewId};

use super::error::RepoError;

// =============================================================================
// Game Storage
// =============================================================================

/// Storage for one directory of games: config, model, views, sounds.
///
/// Loads return `Ok(None)` when the document does not exist so callers can
/// substitute an empty default. Every save is a whole-document overwrite,
/// which makes retrying a failed save safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn list_games(&self) -> Result<Vec<GameName>, RepoError>;

    // Config is owned by another collaborator; stored verbatim
    async fn load_config(&self, game: &GameName) -> Result<Option<Value>, RepoError>;
    async fn save_config(&self, game: &GameName, config: &Value) -> Result<(), RepoError>;

    // Model
    async fn load_model(&self, game: &GameName) -> Result<Option<Model>, RepoError>;
    async fn save_model(&self, game: &GameName, model: &Model) -> Result<(), RepoError>;

    // Views
    async fn list_views(&self, game: &GameName) -> Result<Vec<ViewId>, RepoError>;
    async fn load_view(&self, game: &GameName, view_id: &ViewId)
        -> Result<Option<View>, RepoError>;
    async fn save_view(&self, game: &GameName, view: &View) -> Result<(), RepoError>;
    /// Deleting a view that does not exist is not an error.
    async fn delete_view(&self, game: &GameName, view_id: &ViewId) -> Result<(), RepoError>;

    /// Sound effect paths, prefixed `global/` or `map/`, sorted.
    async fn list_sounds(&self, game: &GameName) -> Result<Vec<String>, RepoError>;
}
