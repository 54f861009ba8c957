//! Sequenced game load: config, model, views, orphan sweep, sounds.

use std::sync::atomic::Ordering;

use serde::Serialize;
use serde_json::Value;

use questforge_domain::{GameName, Model, ViewId};

use super::gc::collect_orphans;
use super::{GameError, GameOrchestrator, GcReport, LoadStep, Revisions};

/// What a load found and repaired.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub game: String,
    pub generation: u64,
    pub states: usize,
    pub connections: usize,
    pub views: Vec<ViewId>,
    /// Listed views that could not be read
    pub skipped_views: Vec<ViewId>,
    pub world_synthesized: bool,
    pub gc: GcReport,
    pub sounds: usize,
}

impl GameOrchestrator {
    /// Load a game into the repositories.
    ///
    /// Missing documents degrade to defaults. A transport failure on config,
    /// model or the view listing aborts the load and leaves the repositories
    /// untouched. A load overtaken by a newer one returns
    /// [`GameError::Superseded`] and applies nothing.
    pub async fn load_game(&self, name: &str) -> Result<LoadReport, GameError> {
        let game = GameName::new(name).map_err(|e| GameError::InvalidGameName(e.to_string()))?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(game = %game, generation, "Loading game");

        let config = match self
            .store
            .load_config(&game)
            .await
            .map_err(|e| GameError::load(LoadStep::Config, e))?
        {
            Some(config) => config,
            None => {
                tracing::info!(game = %game, "No config stored, starting empty");
                Value::Object(Default::default())
            }
        };
        self.ensure_current(generation)?;

        let model = match self
            .store
            .load_model(&game)
            .await
            .map_err(|e| GameError::load(LoadStep::Model, e))?
        {
            Some(model) => model,
            None => {
                tracing::info!(game = %game, "No model stored, starting empty");
                Model::new()
            }
        };
        self.ensure_current(generation)?;

        let view_ids = self
            .store
            .list_views(&game)
            .await
            .map_err(|e| GameError::load(LoadStep::Views, e))?;
        let mut loaded = Vec::with_capacity(view_ids.len());
        let mut skipped_views = Vec::new();
        for view_id in view_ids {
            match self.store.load_view(&game, &view_id).await {
                Ok(Some(view)) => loaded.push(view),
                Ok(None) => {
                    tracing::debug!(game = %game, view_id = %view_id, "Listed view vanished");
                }
                Err(e) => {
                    tracing::warn!(game = %game, view_id = %view_id, error = %e, "Skipping unreadable view");
                    skipped_views.push(view_id);
                }
            }
            self.ensure_current(generation)?;
        }

        let integrity = model.integrity_report();
        if !integrity.is_clean() {
            tracing::warn!(
                game = %game,
                dangling = ?integrity.dangling,
                duplicate_names = ?integrity.duplicate_names,
                extra_starts = ?integrity.extra_starts,
                "Model integrity issues"
            );
        }

        let (report_views, world_synthesized, gc, states, connections) = {
            let mut model_repo = self.model.write().await;
            let mut views_repo = self.views.write().await;
            let mut session = self.session.write().await;
            self.ensure_current(generation)?;

            model_repo.set_model(model);
            views_repo.set_views(loaded);
            let world_synthesized = views_repo.ensure_world();
            if world_synthesized {
                tracing::info!(game = %game, "No world view stored, synthesized an empty one");
            }
            views_repo.set_current_view(ViewId::world())?;

            session.game = Some(game.clone());
            session.config = config;
            session.sounds.clear();
            session.saved = Some(Revisions {
                model: model_repo.revision(),
                views: views_repo.revision(),
            });

            // Repairs stay unsaved until the next save.
            let gc = collect_orphans(model_repo.model(), &mut views_repo);
            (
                views_repo.view_ids(),
                world_synthesized,
                gc,
                model_repo.model().states().len(),
                model_repo.model().connections().len(),
            )
        };

        let sounds = match self.store.list_sounds(&game).await {
            Ok(sounds) => sounds,
            Err(e) => {
                tracing::warn!(game = %game, error = %e, "Failed to list sounds");
                Vec::new()
            }
        };
        {
            let mut session = self.session.write().await;
            self.ensure_current(generation)?;
            session.sounds = sounds;
        }

        let report = LoadReport {
            game: game.to_string(),
            generation,
            states,
            connections,
            views: report_views,
            skipped_views,
            world_synthesized,
            gc,
            sounds: self.session.read().await.sounds.len(),
        };
        tracing::info!(
            game = %game,
            generation,
            states = report.states,
            connections = report.connections,
            views = report.views.len(),
            "Game loaded"
        );
        Ok(report)
    }
}
