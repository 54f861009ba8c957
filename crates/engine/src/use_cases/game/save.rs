//! Best-effort game save: config, model, then every view.

use std::sync::atomic::Ordering;

use serde::Serialize;

use questforge_domain::View;

use super::{GameError, GameOrchestrator, Revisions, SaveStep};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub game: String,
    pub views: usize,
}

impl GameOrchestrator {
    /// Persist a snapshot of the session.
    ///
    /// Config and model failures stop the save and name the step. Every view
    /// is attempted; the ones that failed are reported together. Nothing is
    /// rolled back. Each write is a full overwrite, so calling this again
    /// retries whatever failed. The unsaved flag clears only when every step
    /// succeeded.
    pub async fn save_game(&self) -> Result<SaveReport, GameError> {
        let generation = self.generation.load(Ordering::SeqCst);
        let (game, config) = {
            let session = self.session.read().await;
            let game = session.game.clone().ok_or(GameError::NoGameLoaded)?;
            (game, session.config.clone())
        };
        let (model, model_revision) = {
            let repo = self.model.read().await;
            (repo.snapshot(), repo.revision())
        };
        let (views, views_revision): (Vec<View>, u64) = {
            let repo = self.views.read().await;
            (repo.views().values().cloned().collect(), repo.revision())
        };
        tracing::info!(game = %game, views = views.len(), "Saving game");

        self.store
            .save_config(&game, &config)
            .await
            .map_err(|e| GameError::save(SaveStep::Config, e))?;
        self.store
            .save_model(&game, &model)
            .await
            .map_err(|e| GameError::save(SaveStep::Model, e))?;

        let mut failed = Vec::new();
        for view in &views {
            if let Err(e) = self.store.save_view(&game, view).await {
                let step = SaveStep::View(view.view_id.clone());
                tracing::warn!(game = %game, step = %step, error = %e, "Save step failed");
                failed.push(view.view_id.clone());
            }
        }
        if !failed.is_empty() {
            return Err(GameError::ViewsNotSaved { failed });
        }

        // A load that started meanwhile owns the session now.
        if self.generation.load(Ordering::SeqCst) == generation {
            self.session.write().await.saved = Some(Revisions {
                model: model_revision,
                views: views_revision,
            });
        }
        tracing::info!(game = %game, views = views.len(), "Game saved");
        Ok(SaveReport {
            game: game.to_string(),
            views: views.len(),
        })
    }
}
