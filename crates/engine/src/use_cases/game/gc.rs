//! Orphaned layout sweep.

use serde::Serialize;

use questforge_domain::{ConnectionId, Model, StateId, ViewId};

use super::GameOrchestrator;
use crate::stores::ViewRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedState {
    pub view_id: ViewId,
    pub state_id: StateId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedRoute {
    pub view_id: ViewId,
    pub conn_id: ConnectionId,
}

/// Everything one sweep removed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcReport {
    pub state_layouts: Vec<OrphanedState>,
    pub connection_routes: Vec<OrphanedRoute>,
    pub cleaned: usize,
}

impl GcReport {
    pub fn is_empty(&self) -> bool {
        self.cleaned == 0
    }
}

/// Drop every layout and route entry whose id the model does not have.
/// Logs one warning listing the removed entries when anything was removed.
pub fn collect_orphans(model: &Model, views: &mut ViewRepository) -> GcReport {
    let mut report = GcReport::default();
    for (view_id, pruned) in views.prune_orphans(model) {
        report
            .state_layouts
            .extend(pruned.states.into_iter().map(|state_id| OrphanedState {
                view_id: view_id.clone(),
                state_id,
            }));
        report
            .connection_routes
            .extend(pruned.connections.into_iter().map(|conn_id| OrphanedRoute {
                view_id: view_id.clone(),
                conn_id,
            }));
    }
    report.cleaned = report.state_layouts.len() + report.connection_routes.len();

    if !report.is_empty() {
        tracing::warn!(
            cleaned = report.cleaned,
            state_layouts = ?report.state_layouts,
            connection_routes = ?report.connection_routes,
            "Removed orphaned layout entries"
        );
    }
    report
}

impl GameOrchestrator {
    pub async fn garbage_collect_orphaned_layouts(&self) -> GcReport {
        let model = self.model.read().await;
        let mut views = self.views.write().await;
        collect_orphans(model.model(), &mut views)
    }
}
