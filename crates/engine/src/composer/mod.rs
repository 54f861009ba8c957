//! View composer - converts between (model, view) and the flat diagram
//!
//! Every function here is pure. `compose` and the two `extract_*` functions
//! partition each record's fields: semantic fields go to the model,
//! positional fields (`x`, `y`, `vertex`, `routingMetaData`, rafts) go to the
//! view. Composing and extracting again reproduces both sides for every
//! entity visible in the view.

use std::collections::BTreeMap;

use serde::Serialize;

use questforge_domain::{ConnectionId, Model, StateId, View, ViewLayout};
use questforge_shared::{DiagramRecord, FlatDiagram, StateShape, TriggerConnection};


/// Per-id differences between two versions of one entity map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDiff<Id> {
    pub added: Vec<Id>,
    pub removed: Vec<Id>,
    pub changed: Vec<Id>,
}

impl<Id> EntityDiff<Id> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDiff {
    pub states: EntityDiff<StateId>,
    pub connections: EntityDiff<ConnectionId>,
}

impl ModelDiff {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.connections.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiagramCount {
    pub states: usize,
    pub connections: usize,
}

/// Render the part of `model` visible in `view`.
///
/// Order: rafts, then states with a layout entry, then connections whose
/// endpoints were both emitted. A connection without a stored route gets an
/// empty vertex list.
pub fn compose(model: &Model, view: &View) -> FlatDiagram {
    let mut diagram: FlatDiagram = view.rafts.iter().cloned().map(DiagramRecord::Raft).collect();

    for state in model.states().values() {
        if let Some(position) = view.state_layout(&state.id) {
            diagram.push(DiagramRecord::StateShape(StateShape::new(
                state.clone(),
                position,
            )));
        }
    }

    for connection in model.connections().values() {
        if !view.is_connection_visible(connection) {
            continue;
        }
        let route = view
            .connection_routes
            .get(&connection.id)
            .cloned()
            .unwrap_or_default();
        diagram.push(DiagramRecord::TriggerConnection(TriggerConnection::new(
            connection.clone(),
            route,
        )));
    }

    diagram
}

/// The semantic half of a diagram. Rafts and unknown figures are ignored.
pub fn extract_model(diagram: &[DiagramRecord]) -> Model {
    let mut states = Vec::new();
    let mut connections = Vec::new();
    for record in diagram {
        match record {
            DiagramRecord::StateShape(shape) => {
                let mut state = shape.state.clone();
                state.strip_layout();
                states.push(state);
            }
            DiagramRecord::TriggerConnection(figure) => {
                let mut connection = figure.connection.clone();
                connection.strip_layout();
                connections.push(connection);
            }
            DiagramRecord::Raft(_) | DiagramRecord::Unknown => {}
        }
    }
    Model::from_parts(states, connections)
}

/// The positional half of a diagram.
pub fn extract_layout(diagram: &[DiagramRecord]) -> ViewLayout {
    let mut layout = ViewLayout::default();
    for record in diagram {
        match record {
            DiagramRecord::StateShape(shape) => {
                layout
                    .state_layouts
                    .insert(shape.state.id.clone(), shape.position());
            }
            // An unrouted connection is drawn with an empty route; keep it absent.
            DiagramRecord::TriggerConnection(figure) if !figure.route.is_default() => {
                layout
                    .connection_routes
                    .insert(figure.connection.id.clone(), figure.route.clone());
            }
            DiagramRecord::TriggerConnection(_) => {}
            DiagramRecord::Raft(raft) => layout.rafts.push(raft.clone()),
            DiagramRecord::Unknown => {}
        }
    }
    layout
}

/// Compare two models id by id, with deep equality for shared ids.
pub fn diff_models(old: &Model, new: &Model) -> ModelDiff {
    ModelDiff {
        states: diff_maps(old.states(), new.states()),
        connections: diff_maps(old.connections(), new.connections()),
    }
}

fn diff_maps<Id, T>(old: &BTreeMap<Id, T>, new: &BTreeMap<Id, T>) -> EntityDiff<Id>
where
    Id: Ord + Clone,
    T: PartialEq,
{
    let added = new
        .keys()
        .filter(|id| !old.contains_key(*id))
        .cloned()
        .collect();
    let mut removed = Vec::new();
    let mut changed = Vec::new();
    for (id, before) in old {
        match new.get(id) {
            None => removed.push(id.clone()),
            Some(after) if after != before => changed.push(id.clone()),
            Some(_) => {}
        }
    }
    EntityDiff {
        added,
        removed,
        changed,
    }
}

/// The sub-model visible in `view`.
pub fn restrict_model(model: &Model, view: &View) -> Model {
    Model::from_parts(
        model
            .states()
            .values()
            .filter(|s| view.is_state_visible(&s.id))
            .cloned(),
        model
            .connections()
            .values()
            .filter(|c| view.is_connection_visible(c))
            .cloned(),
    )
}

pub fn is_empty(diagram: &[DiagramRecord]) -> bool {
    diagram.is_empty()
}

pub fn count(diagram: &[DiagramRecord]) -> DiagramCount {
    diagram
        .iter()
        .fold(DiagramCount::default(), |mut count, record| {
            match record {
                DiagramRecord::StateShape(_) => count.states += 1,
                DiagramRecord::TriggerConnection(_) => count.connections += 1,
                DiagramRecord::Raft(_) | DiagramRecord::Unknown => {}
            }
            count
        })
}

pub fn find_by_id<'a>(diagram: &'a [DiagramRecord], id: &str) -> Option<&'a DiagramRecord> {
    diagram.iter().find(|record| record.id() == Some(id))
}

/// Copy the source layout of each listed state into a copy of `target`.
/// States the source does not position are skipped; routes are untouched.
pub fn copy_layout_to_view(source: &View, target: &View, state_ids: &[StateId]) -> View {
    let mut view = target.clone();
    for id in state_ids {
        if let Some(position) = source.state_layout(id) {
            view.set_state_layout(id.clone(), position);
        }
    }
    view
}
