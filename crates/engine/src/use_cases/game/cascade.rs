//! Cascading deletes across the model and every view.

use serde::Serialize;

use questforge_domain::{ConnectionId, StateId, ViewId};

use super::GameOrchestrator;
use crate::stores::{ModelRepository, ViewRepository};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDeletion {
    /// False if the model had no such state
    pub removed: bool,
    pub connections: Vec<ConnectionId>,
    pub views: Vec<ViewId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDeletion {
    pub removed: bool,
    pub views: Vec<ViewId>,
}

/// Remove a connection from the model and its route from every view.
pub fn cascade_remove_connection(
    model: &mut ModelRepository,
    views: &mut ViewRepository,
    connection_id: &ConnectionId,
) -> ConnectionDeletion {
    let removed = model.remove_connection(connection_id).is_some();
    let views = views.remove_connection_from_all_views(connection_id);
    ConnectionDeletion { removed, views }
}

/// Remove a state and everything that references it.
///
/// Attached connections are removed from the model and every view before
/// the state itself, then the state's layout is removed from every view.
pub fn cascade_remove_state(
    model: &mut ModelRepository,
    views: &mut ViewRepository,
    state_id: &StateId,
) -> StateDeletion {
    let connections = model.model().connections_touching(state_id);
    let mut touched = Vec::new();
    for connection_id in &connections {
        touched.extend(cascade_remove_connection(model, views, connection_id).views);
    }
    let removed = model.remove_state(state_id).is_some();
    touched.extend(views.remove_state_from_all_views(state_id));
    touched.sort();
    touched.dedup();
    StateDeletion {
        removed,
        connections,
        views: touched,
    }
}

impl GameOrchestrator {
    pub async fn remove_state(&self, state_id: &StateId) -> StateDeletion {
        let mut model = self.model.write().await;
        let mut views = self.views.write().await;
        let deletion = cascade_remove_state(&mut model, &mut views, state_id);
        tracing::info!(
            state_id = %state_id,
            removed = deletion.removed,
            connections = deletion.connections.len(),
            views = deletion.views.len(),
            "State deleted"
        );
        deletion
    }

    pub async fn remove_connection(&self, connection_id: &ConnectionId) -> ConnectionDeletion {
        let mut model = self.model.write().await;
        let mut views = self.views.write().await;
        let deletion = cascade_remove_connection(&mut model, &mut views, connection_id);
        tracing::info!(
            connection_id = %connection_id,
            removed = deletion.removed,
            views = deletion.views.len(),
            "Connection deleted"
        );
        deletion
    }
}
