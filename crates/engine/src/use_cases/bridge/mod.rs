//! Diagram bridge - keeps the drawing surface and the repositories in step.
//!
//! Inbound: every surface message is handled here. An edited diagram is
//! split by the composer and folded into the model and into the current
//! view only. Outbound: edits made outside the surface are pushed as
//! single-figure patches tagged `localEdit`; the surface's reflection of
//! such a patch arrives tagged `remoteEcho` and is dropped.

use std::sync::Arc;

use serde::Serialize;

use questforge_domain::{
    Attributes, Connection, ConnectionId, DomainError, Model, State, StateId, Trigger, View,
    ViewId,
};
use questforge_shared::{FlatDiagram, HostMessage, Origin, ShapePatch, SurfaceMessage};

use crate::composer;
use crate::infrastructure::ports::{EditorEvent, SurfaceSink};
use crate::stores::{SharedModel, SharedViews};
use crate::use_cases::game::importable_states;


#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("No current view")]
    NoCurrentView,
    #[error("{entity_type} not found: {id}")]
    UnknownEntity {
        entity_type: &'static str,
        id: String,
    },
    #[error("Failed to encode shape patch: {0}")]
    Encode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl BridgeError {
    fn unknown(entity_type: &'static str, id: impl ToString) -> Self {
        Self::UnknownEntity {
            entity_type,
            id: id.to_string(),
        }
    }
}

/// What folding one surface document changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub view_id: Option<ViewId>,
    pub added_states: Vec<StateId>,
    pub changed_states: Vec<StateId>,
    /// States that left the diagram; hidden from the current view only
    pub removed_states: Vec<StateId>,
    pub upserted_connections: Vec<ConnectionId>,
    /// Connections that left the diagram; their routes leave the current view
    pub removed_connections: Vec<ConnectionId>,
    pub layout_changed: bool,
    pub demoted: Vec<StateId>,
}

pub struct DiagramBridge {
    model: SharedModel,
    views: SharedViews,
    sink: Arc<dyn SurfaceSink>,
}

impl DiagramBridge {
    pub fn new(model: SharedModel, views: SharedViews, sink: Arc<dyn SurfaceSink>) -> Self {
        Self { model, views, sink }
    }

    pub async fn handle(&self, message: SurfaceMessage) -> Result<(), BridgeError> {
        match message {
            SurfaceMessage::CanvasReady => {
                tracing::debug!("Surface ready");
                self.refresh().await
            }
            SurfaceMessage::DocumentUpdated {
                origin: Origin::RemoteEcho,
                data,
            } => {
                tracing::debug!(records = data.len(), "Dropping echoed document");
                Ok(())
            }
            SurfaceMessage::DocumentUpdated { data, .. } => {
                self.reconcile(data).await.map(|_| ())
            }
            SurfaceMessage::Select { shape_type, data } => {
                self.sink
                    .notify(EditorEvent::Selected { shape_type, data })
                    .await;
                Ok(())
            }
            SurfaceMessage::Unselect => {
                self.sink.notify(EditorEvent::Unselected).await;
                Ok(())
            }
            SurfaceMessage::OpenImportDialog => self.request_import().await,
            SurfaceMessage::ChatFromHere { state_name } => {
                let state_id = self
                    .model
                    .read()
                    .await
                    .model()
                    .find_state_by_name(&state_name)
                    .map(|s| s.id.clone());
                if state_id.is_none() {
                    tracing::warn!(state_name = %state_name, "Chat requested from unknown state");
                }
                self.sink
                    .notify(EditorEvent::ChatRequested {
                        state_name,
                        state_id,
                    })
                    .await;
                Ok(())
            }
        }
    }

    /// The current view composed for the surface.
    pub async fn current_diagram(&self) -> Result<FlatDiagram, BridgeError> {
        let model = self.model.read().await;
        let views = self.views.read().await;
        let view_id = views.current_view_id().ok_or(BridgeError::NoCurrentView)?;
        Ok(match views.view(view_id) {
            Some(view) => composer::compose(model.model(), view),
            None => composer::compose(model.model(), &View::empty(view_id.clone())),
        })
    }

    /// Send the whole current diagram to every surface.
    pub async fn refresh(&self) -> Result<(), BridgeError> {
        let data = self.current_diagram().await?;
        tracing::debug!(records = data.len(), "Publishing document");
        self.sink.publish(HostMessage::SetDocument { data }).await;
        Ok(())
    }

    /// Fold an edited diagram back into the repositories.
    ///
    /// Added and changed entities are merged into the model; nothing is
    /// deleted from it. Positions go to the current view only. Shapes that
    /// left the diagram lose their layout in the current view and stay in
    /// the model and in every other view. An empty diagram carries no
    /// edit and is ignored.
    pub async fn reconcile(&self, diagram: FlatDiagram) -> Result<Reconciliation, BridgeError> {
        if diagram.is_empty() {
            tracing::debug!("Ignoring empty document");
            return Ok(Reconciliation::default());
        }
        let partial = composer::extract_model(&diagram);
        let layout = composer::extract_layout(&diagram);

        let (outcome, patches) = {
            let mut model = self.model.write().await;
            let mut views = self.views.write().await;
            let view_id = views
                .current_view_id()
                .cloned()
                .ok_or(BridgeError::NoCurrentView)?;
            let current = views
                .view(&view_id)
                .cloned()
                .unwrap_or_else(|| View::empty(view_id.clone()));

            let visible = composer::restrict_model(model.model(), &current);
            let diff = composer::diff_models(&visible, &partial);
            let mut outcome = Reconciliation {
                view_id: Some(view_id.clone()),
                added_states: diff.states.added.clone(),
                changed_states: diff.states.changed.clone(),
                removed_states: diff.states.removed.clone(),
                removed_connections: diff.connections.removed.clone(),
                ..Reconciliation::default()
            };

            let changed = Model::from_parts(
                diff.states
                    .added
                    .iter()
                    .chain(&diff.states.changed)
                    .filter_map(|id| partial.state(id).cloned()),
                diff.connections
                    .added
                    .iter()
                    .chain(&diff.connections.changed)
                    .filter_map(|id| partial.connection(id).cloned()),
            );
            outcome.upserted_connections = changed.connections().keys().cloned().collect();
            if !changed.is_empty() {
                outcome.demoted = model.merge(changed).demoted;
            }

            let mut relaid = current.clone();
            for state_id in &diff.states.removed {
                relaid.remove_state(state_id);
            }
            // A drawn connection without a route falls back to default routing.
            let cleared: Vec<ConnectionId> = partial
                .connections()
                .keys()
                .chain(&diff.connections.removed)
                .filter(|id| !layout.connection_routes.contains_key(*id))
                .filter(|id| {
                    relaid
                        .connection_routes
                        .get(*id)
                        .is_some_and(|route| !route.is_default())
                })
                .cloned()
                .collect();
            for connection_id in &cleared {
                relaid.remove_connection(connection_id);
            }
            relaid.apply_layout(layout);
            if views.view(&view_id) != Some(&relaid) {
                views.set_view(view_id.clone(), relaid);
                outcome.layout_changed = true;
            }

            let view = views.view(&view_id);
            let patches = outcome
                .demoted
                .iter()
                .filter(|id| view.is_some_and(|v| v.is_state_visible(id)))
                .filter_map(|id| model.model().state(id))
                .map(|state| shape_patch(state.id.as_str(), state))
                .collect::<Result<Vec<_>, _>>()?;
            (outcome, patches)
        };

        tracing::debug!(
            view_id = ?outcome.view_id,
            added = outcome.added_states.len(),
            changed = outcome.changed_states.len(),
            removed_states = outcome.removed_states.len(),
            removed_connections = outcome.removed_connections.len(),
            layout_changed = outcome.layout_changed,
            "Document reconciled"
        );
        self.publish_patches(patches).await;
        Ok(outcome)
    }

    // =========================================================================
    // Edits from outside the surface
    // =========================================================================

    /// Write a state edited in a property panel and patch the surface.
    pub async fn update_state(&self, mut state: State) -> Result<Vec<StateId>, BridgeError> {
        state.strip_layout();
        let state_id = state.id.clone();
        let (demoted, patches) = {
            let mut model = self.model.write().await;
            let views = self.views.read().await;
            let upsert = model.upsert_state(state);
            let view = views.current_view();
            let patches = std::iter::once(&state_id)
                .chain(&upsert.demoted)
                .filter(|id| view.is_some_and(|v| v.is_state_visible(id)))
                .filter_map(|id| model.model().state(id))
                .map(|s| shape_patch(s.id.as_str(), s))
                .collect::<Result<Vec<_>, _>>()?;
            (upsert.demoted, patches)
        };
        tracing::debug!(state_id = %state_id, demoted = demoted.len(), "State edited");
        self.publish_patches(patches).await;
        Ok(demoted)
    }

    pub async fn update_connection(&self, mut connection: Connection) -> Result<(), BridgeError> {
        connection.strip_layout();
        let connection_id = connection.id.clone();
        let patch = {
            let mut model = self.model.write().await;
            let views = self.views.read().await;
            let visible = views
                .current_view()
                .is_some_and(|v| v.is_connection_visible(&connection));
            let patch = if visible {
                Some(shape_patch(connection.id.as_str(), &connection)?)
            } else {
                None
            };
            model.upsert_connection(connection);
            patch
        };
        tracing::debug!(connection_id = %connection_id, "Connection edited");
        self.publish_patches(patch.into_iter().collect()).await;
        Ok(())
    }

    /// Replace a trigger in its owning state and patch that state.
    pub async fn update_trigger(&self, trigger: Trigger) -> Result<StateId, BridgeError> {
        let trigger_id = trigger.id.clone();
        let (owner, patch) = {
            let mut model = self.model.write().await;
            let views = self.views.read().await;
            let owner = model
                .update_trigger(trigger)
                .ok_or_else(|| BridgeError::unknown("Trigger", &trigger_id))?;
            let patch = match model.model().state(&owner) {
                Some(state)
                    if views
                        .current_view()
                        .is_some_and(|v| v.is_state_visible(&owner)) =>
                {
                    Some(shape_patch(owner.as_str(), state)?)
                }
                _ => None,
            };
            (owner, patch)
        };
        tracing::debug!(trigger_id = %trigger_id, state_id = %owner, "Trigger edited");
        self.publish_patches(patch.into_iter().collect()).await;
        Ok(owner)
    }

    async fn request_import(&self) -> Result<(), BridgeError> {
        let event = {
            let model = self.model.read().await;
            let views = self.views.read().await;
            let view_id = views
                .current_view_id()
                .cloned()
                .ok_or(BridgeError::NoCurrentView)?;
            if !view_id.is_encounter() {
                tracing::warn!(view_id = %view_id, "Import dialog requested outside an encounter");
                return Ok(());
            }
            let candidates = importable_states(&model, &views, &view_id);
            EditorEvent::ImportRequested {
                view_id,
                candidates,
            }
        };
        self.sink.notify(event).await;
        Ok(())
    }

    async fn publish_patches(&self, patches: Vec<ShapePatch>) {
        for data in patches {
            self.sink
                .publish(HostMessage::SetShapeData {
                    data,
                    origin: Origin::LocalEdit,
                })
                .await;
        }
    }
}

/// The serialized entity minus its id, as a patch for figure `id`.
fn shape_patch<T: Serialize>(id: &str, entity: &T) -> Result<ShapePatch, BridgeError> {
    let value = serde_json::to_value(entity).map_err(|e| BridgeError::Encode(e.to_string()))?;
    let mut fields: Attributes = serde_json::from_value(value)
        .map_err(|e| BridgeError::Encode(e.to_string()))?;
    fields.remove("id");
    Ok(ShapePatch {
        id: id.to_string(),
        fields,
    })
}
