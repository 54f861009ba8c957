//! Game orchestrator.
//!
//! Owns the editing session of one game: sequenced load, best-effort save,
//! orphan sweeps, the cascading state delete and encounter navigation.
//! The model and view repositories are shared with the diagram bridge;
//! whenever both are locked, the model is locked first.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use questforge_domain::{DomainError, GameName, ViewId};

use crate::infrastructure::ports::{GameStore, RepoError};
use crate::stores::{SharedModel, SharedViews};

mod cascade;
mod encounter;
mod gc;
mod load;
mod save;


pub use cascade::{ConnectionDeletion, StateDeletion};
pub use encounter::{encounter_view_id, importable_states, EncounterSummary};
pub use gc::{collect_orphans, GcReport, OrphanedRoute, OrphanedState};
pub use load::LoadReport;
pub use save::SaveReport;

/// Load stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    Config,
    Model,
    Views,
}

impl fmt::Display for LoadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Model => write!(f, "model"),
            Self::Views => write!(f, "views"),
        }
    }
}

/// Save stage that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStep {
    Config,
    Model,
    View(ViewId),
}

impl fmt::Display for SaveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Model => write!(f, "model"),
            Self::View(id) => write!(f, "view {id}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("No game is loaded")]
    NoGameLoaded,
    #[error("Invalid game name: {0}")]
    InvalidGameName(String),
    #[error("Load {generation} was superseded by a newer load")]
    Superseded { generation: u64 },
    #[error("Loading {step} failed: {source}")]
    Load { step: LoadStep, source: RepoError },
    #[error("Saving {step} failed: {source}")]
    Save { step: SaveStep, source: RepoError },
    #[error("Views not saved: {}", format_ids(.failed))]
    ViewsNotSaved { failed: Vec<ViewId> },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl GameError {
    pub fn load(step: LoadStep, source: RepoError) -> Self {
        Self::Load { step, source }
    }

    pub fn save(step: SaveStep, source: RepoError) -> Self {
        Self::Save { step, source }
    }
}

fn format_ids(ids: &[ViewId]) -> String {
    ids.iter()
        .map(ViewId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository revisions as of the last successful load or save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Revisions {
    model: u64,
    views: u64,
}

#[derive(Debug, Default)]
struct Session {
    game: Option<GameName>,
    /// Opaque game configuration, saved back unchanged
    config: Value,
    sounds: Vec<String>,
    saved: Option<Revisions>,
}

/// Snapshot of the editing session for the host UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorStatus {
    pub game: Option<String>,
    pub current_view: Option<ViewId>,
    pub unsaved_changes: bool,
    pub states: usize,
    pub connections: usize,
    pub views: Vec<ViewId>,
    pub sounds: Vec<String>,
}

pub struct GameOrchestrator {
    store: Arc<dyn GameStore>,
    model: SharedModel,
    views: SharedViews,
    session: RwLock<Session>,
    generation: AtomicU64,
}

impl GameOrchestrator {
    pub fn new(store: Arc<dyn GameStore>, model: SharedModel, views: SharedViews) -> Self {
        Self {
            store,
            model,
            views,
            session: RwLock::new(Session::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub async fn current_game(&self) -> Option<GameName> {
        self.session.read().await.game.clone()
    }

    pub async fn config(&self) -> Value {
        self.session.read().await.config.clone()
    }

    pub async fn sounds(&self) -> Vec<String> {
        self.session.read().await.sounds.clone()
    }

    /// True if either repository changed since the last load or successful save.
    pub async fn has_unsaved_changes(&self) -> bool {
        let current = self.revisions().await;
        let session = self.session.read().await;
        session.game.is_some() && session.saved != Some(current)
    }

    pub async fn status(&self) -> EditorStatus {
        let unsaved_changes = self.has_unsaved_changes().await;
        let (states, connections) = {
            let model = self.model.read().await;
            (
                model.model().states().len(),
                model.model().connections().len(),
            )
        };
        let (current_view, views) = {
            let views = self.views.read().await;
            (views.current_view_id().cloned(), views.view_ids())
        };
        let session = self.session.read().await;
        EditorStatus {
            game: session.game.as_ref().map(|g| g.to_string()),
            current_view,
            unsaved_changes,
            states,
            connections,
            views,
            sounds: session.sounds.clone(),
        }
    }

    async fn require_game(&self) -> Result<GameName, GameError> {
        self.current_game().await.ok_or(GameError::NoGameLoaded)
    }

    async fn revisions(&self) -> Revisions {
        let model = self.model.read().await.revision();
        let views = self.views.read().await.revision();
        Revisions { model, views }
    }

    fn ensure_current(&self, generation: u64) -> Result<(), GameError> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            Err(GameError::Superseded { generation })
        }
    }
}
