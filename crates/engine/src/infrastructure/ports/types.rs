//! Helper types for port operations.

use serde::Serialize;
use serde_json::Value;

use questforge_domain::{StateId, ViewId};
use questforge_shared::ShapeKind;

// =============================================================================
// Editor Events
// =============================================================================

/// A state offered for import into an encounter view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportCandidate {
    pub id: StateId,
    pub name: String,
}

/// Surface activity the host UI reacts to (selection panels, dialogs).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditorEvent {
    Selected {
        shape_type: ShapeKind,
        data: Value,
    },
    Unselected,
    ImportRequested {
        view_id: ViewId,
        candidates: Vec<ImportCandidate>,
    },
    ChatRequested {
        state_name: String,
        /// `None` if no state carries that name
        state_id: Option<StateId>,
    },
}
