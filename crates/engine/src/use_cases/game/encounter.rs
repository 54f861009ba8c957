//! Encounter navigation, import and view deletion.

use serde::Serialize;

use questforge_domain::{DomainError, EncounterConfig, StateId, View, ViewId};

use super::{GameError, GameOrchestrator, SaveStep};
use crate::composer::copy_layout_to_view;
use crate::infrastructure::ports::ImportCandidate;
use crate::stores::{ModelRepository, ViewRepository};

/// An encounter as derived from its view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterSummary {
    pub name: String,
    pub view_id: ViewId,
    pub config: EncounterConfig,
    pub states: usize,
}

impl EncounterSummary {
    pub fn from_view(view: &View) -> Option<Self> {
        let name = view.view_id.encounter_name()?.to_string();
        let config = view.encounter_config.clone().unwrap_or_else(|| EncounterConfig {
            name: name.clone(),
            ..EncounterConfig::default()
        });
        Some(Self {
            name,
            view_id: view.view_id.clone(),
            config,
            states: view.state_layouts.len(),
        })
    }
}

/// The view id for encounter `name`. Names end up in file names.
pub fn encounter_view_id(name: &str) -> Result<ViewId, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Encounter name cannot be empty"));
    }
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(DomainError::validation(format!(
            "Encounter name contains a path separator: {name}"
        )));
    }
    Ok(ViewId::encounter(name))
}

/// States laid out in the world view but not in `encounter`, sorted by name.
pub fn importable_states(
    model: &ModelRepository,
    views: &ViewRepository,
    encounter: &ViewId,
) -> Vec<ImportCandidate> {
    let Some(world) = views.view(&ViewId::world()) else {
        return Vec::new();
    };
    let target = views.view(encounter);
    let mut candidates: Vec<ImportCandidate> = model
        .model()
        .states()
        .values()
        .filter(|s| world.is_state_visible(&s.id))
        .filter(|s| !target.is_some_and(|v| v.is_state_visible(&s.id)))
        .map(|s| ImportCandidate {
            id: s.id.clone(),
            name: s.name.clone(),
        })
        .collect();
    candidates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    candidates
}

impl GameOrchestrator {
    /// Make encounter `name` the current view, creating its view if needed.
    pub async fn open_encounter(&self, name: &str) -> Result<ViewId, GameError> {
        self.require_game().await?;
        let view_id = encounter_view_id(name)?;
        let mut views = self.views.write().await;
        views.set_current_view(view_id.clone())?;
        if views.view(&view_id).is_none() {
            views.set_view(view_id.clone(), View::encounter(name.trim()));
            tracing::info!(view_id = %view_id, "Created encounter view");
        }
        tracing::debug!(view_id = %view_id, "Encounter opened");
        Ok(view_id)
    }

    pub async fn close_encounter(&self) -> Result<(), GameError> {
        self.views.write().await.set_current_view(ViewId::world())?;
        tracing::debug!("Back to world view");
        Ok(())
    }

    pub async fn encounters(&self) -> Vec<EncounterSummary> {
        self.views
            .read()
            .await
            .encounter_views()
            .filter_map(EncounterSummary::from_view)
            .collect()
    }

    pub async fn importable_states(&self, name: &str) -> Result<Vec<ImportCandidate>, GameError> {
        let view_id = encounter_view_id(name)?;
        let model = self.model.read().await;
        let views = self.views.read().await;
        Ok(importable_states(&model, &views, &view_id))
    }

    /// Copy the world layout of `state_id` into encounter `name`. Connections
    /// whose endpoints are now both present become visible there.
    pub async fn import_state(&self, name: &str, state_id: &StateId) -> Result<(), GameError> {
        let view_id = encounter_view_id(name)?;
        let model = self.model.read().await;
        if !model.model().contains_state(state_id) {
            return Err(DomainError::not_found("State", state_id.as_str()).into());
        }
        let mut views = self.views.write().await;
        let world = views
            .view(&ViewId::world())
            .ok_or_else(|| DomainError::not_found("View", ViewId::WORLD))?;
        if !world.is_state_visible(state_id) {
            return Err(DomainError::not_found("World layout", state_id.as_str()).into());
        }
        let target = views
            .view(&view_id)
            .ok_or_else(|| DomainError::not_found("View", view_id.as_str()))?;
        let updated = copy_layout_to_view(world, target, std::slice::from_ref(state_id));
        views.set_view(view_id.clone(), updated);
        tracing::info!(view_id = %view_id, state_id = %state_id, "Imported state into encounter");
        Ok(())
    }

    /// Delete a view from the store and the repository. The world view
    /// cannot be deleted.
    pub async fn delete_view(&self, view_id: &ViewId) -> Result<(), GameError> {
        let game = self.require_game().await?;
        if view_id.is_world() {
            return Err(DomainError::constraint("The world view cannot be deleted").into());
        }
        self.store
            .delete_view(&game, view_id)
            .await
            .map_err(|e| GameError::save(SaveStep::View(view_id.clone()), e))?;
        self.views.write().await.remove_view(view_id)?;
        tracing::info!(game = %game, view_id = %view_id, "View deleted");
        Ok(())
    }
}
