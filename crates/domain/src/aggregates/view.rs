//! View aggregate - A named layout overlay over the model
//!
//! A view positions a subset of the model. Visibility follows from layout:
//! - A state is visible iff it has a `stateLayouts` entry
//! - A connection is visible iff both its endpoints are visible; a missing
//!   route only means default routing
//!
//! Entries pointing at entities the model no longer has are tolerated and
//! swept by garbage collection, see [`View::prune_orphans`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::{Connection, Raft};
use crate::events::PrunedLayouts;
use crate::value_objects::{Position, Route};
use crate::Model;
use questforge_domain::{ConnectionId, StateId, ViewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    World,
    Encounter,
}

impl ViewType {
    /// The type implied by a view id, for documents that do not state it.
    pub fn for_id(id: &ViewId) -> Self {
        if id.is_world() {
            Self::World
        } else {
            Self::Encounter
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => write!(f, "world"),
            Self::Encounter => write!(f, "encounter"),
        }
    }
}

/// Metadata of an encounter, stored on its view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncounterConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub encounter_prompt: String,
}

/// The positional content of a view, as split off a flat diagram.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewLayout {
    pub state_layouts: BTreeMap<StateId, Position>,
    pub connection_routes: BTreeMap<ConnectionId, Route>,
    pub rafts: Vec<Raft>,
}

/// A layout overlay: `{ viewId, viewType, stateLayouts, connectionRoutes, rafts?, encounterConfig? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ViewDocument")]
pub struct View {
    pub view_id: ViewId,
    pub view_type: ViewType,
    pub state_layouts: BTreeMap<StateId, Position>,
    pub connection_routes: BTreeMap<ConnectionId, Route>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rafts: Vec<Raft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter_config: Option<EncounterConfig>,
}

/// Stored form of a view. Older files use `id`/`type` and may omit either.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewDocument {
    #[serde(alias = "id", default)]
    view_id: Option<ViewId>,
    #[serde(alias = "type", default)]
    view_type: Option<ViewType>,
    #[serde(default)]
    state_layouts: BTreeMap<StateId, Position>,
    #[serde(default)]
    connection_routes: BTreeMap<ConnectionId, Route>,
    #[serde(default)]
    rafts: Vec<Raft>,
    #[serde(default)]
    encounter_config: Option<EncounterConfig>,
}

impl From<ViewDocument> for View {
    fn from(doc: ViewDocument) -> Self {
        let view_id = doc.view_id.unwrap_or_else(|| ViewId::from(""));
        let view_type = doc.view_type.unwrap_or_else(|| ViewType::for_id(&view_id));
        Self {
            view_id,
            view_type,
            state_layouts: doc.state_layouts,
            connection_routes: doc.connection_routes,
            rafts: doc.rafts,
            encounter_config: doc.encounter_config,
        }
    }
}

impl View {
    /// An empty view of the type implied by its id.
    pub fn empty(view_id: ViewId) -> Self {
        let view_type = ViewType::for_id(&view_id);
        Self {
            view_id,
            view_type,
            state_layouts: BTreeMap::new(),
            connection_routes: BTreeMap::new(),
            rafts: Vec::new(),
            encounter_config: None,
        }
    }

    /// The empty world view synthesized when none is stored.
    pub fn world() -> Self {
        Self::empty(ViewId::world())
    }

    /// An empty overlay for encounter `name`, carrying its metadata.
    pub fn encounter(name: &str) -> Self {
        let mut view = Self::empty(ViewId::encounter(name));
        view.encounter_config = Some(EncounterConfig {
            name: name.to_string(),
            ..EncounterConfig::default()
        });
        view
    }

    /// Pin the view to the id it is stored under.
    ///
    /// The storage key wins over whatever id the document carries. A world
    /// view is always typed `world`.
    pub fn normalized(mut self, stored_as: &ViewId) -> Self {
        if &self.view_id != stored_as {
            self.view_id = stored_as.clone();
        }
        if self.view_id.is_world() {
            self.view_type = ViewType::World;
        }
        self
    }

    pub fn with_layout(mut self, layout: ViewLayout) -> Self {
        self.apply_layout(layout);
        self
    }

    pub fn is_world(&self) -> bool {
        self.view_type == ViewType::World
    }

    pub fn is_empty(&self) -> bool {
        self.state_layouts.is_empty() && self.connection_routes.is_empty() && self.rafts.is_empty()
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    pub fn is_state_visible(&self, id: &StateId) -> bool {
        self.state_layouts.contains_key(id)
    }

    pub fn is_connection_visible(&self, connection: &Connection) -> bool {
        self.is_state_visible(connection.source_id()) && self.is_state_visible(connection.target_id())
    }

    pub fn state_layout(&self, id: &StateId) -> Option<Position> {
        self.state_layouts.get(id).copied()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn set_state_layout(&mut self, id: StateId, position: Position) {
        self.state_layouts.insert(id, position);
    }

    pub fn set_connection_route(&mut self, id: ConnectionId, route: Route) {
        self.connection_routes.insert(id, route);
    }

    pub fn remove_state(&mut self, id: &StateId) -> bool {
        self.state_layouts.remove(id).is_some()
    }

    pub fn remove_connection(&mut self, id: &ConnectionId) -> bool {
        self.connection_routes.remove(id).is_some()
    }

    /// Merge positional content: upsert each layout and route, replace rafts.
    pub fn apply_layout(&mut self, layout: ViewLayout) {
        self.state_layouts.extend(layout.state_layouts);
        self.connection_routes.extend(layout.connection_routes);
        self.rafts = layout.rafts;
    }

    /// Drop layout and route entries for ids the model does not contain.
    pub fn prune_orphans(&mut self, model: &Model) -> PrunedLayouts {
        let states: Vec<StateId> = self
            .state_layouts
            .keys()
            .filter(|id| !model.contains_state(id))
            .cloned()
            .collect();
        let connections: Vec<ConnectionId> = self
            .connection_routes
            .keys()
            .filter(|id| !model.contains_connection(id))
            .cloned()
            .collect();

        for id in &states {
            self.state_layouts.remove(id);
        }
        for id in &connections {
            self.connection_routes.remove(id);
        }

        PrunedLayouts {
            states,
            connections,
        }
    }
}
