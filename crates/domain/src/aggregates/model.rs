//! Model aggregate - The canonical, layout-free graph of one game
//!
//! # Invariants
//!
//! - Every map key equals the id of the record it holds
//! - At most one state is START; writing a START state demotes the others
//!
//! Referential integrity of connection endpoints is *not* enforced on write.
//! Dangling endpoints are reported by [`Model::integrity_report`] and repaired
//! by deleting the connection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::entities::{Connection, State, StateType, Trigger};
use crate::events::{ModelMerge, StateUpsert};
use questforge_domain::{ConnectionId, StateId, TriggerId};

/// The canonical state graph: states and connections keyed by id.
///
/// Serialized as `{ "states": { id: State }, "connections": { id: Connection } }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    states: BTreeMap<StateId, State>,
    #[serde(default)]
    connections: BTreeMap<ConnectionId, Connection>,
}

/// Data-integrity findings. Reported, never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntegrityReport {
    /// Connections with an endpoint that is not a state of the model
    pub dangling: Vec<(ConnectionId, StateId)>,
    /// State names used by more than one state
    pub duplicate_names: Vec<String>,
    /// All START states, when there is more than one
    pub extra_starts: Vec<StateId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.duplicate_names.is_empty() && self.extra_starts.is_empty()
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from records, keying each by its own id.
    ///
    /// No START demotion happens here: a stored model is taken as-is.
    pub fn from_parts(
        states: impl IntoIterator<Item = State>,
        connections: impl IntoIterator<Item = Connection>,
    ) -> Self {
        Self {
            states: states.into_iter().map(|s| (s.id.clone(), s)).collect(),
            connections: connections.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// Re-key every record by its own id and drop positional attributes that
    /// do not belong in the model. Applied to every model read from storage.
    pub fn normalized(self) -> Self {
        Self::from_parts(
            self.states.into_values().map(|mut s| {
                s.strip_layout();
                s
            }),
            self.connections.into_values().map(|mut c| {
                c.strip_layout();
                c
            }),
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn states(&self) -> &BTreeMap<StateId, State> {
        &self.states
    }

    pub fn connections(&self) -> &BTreeMap<ConnectionId, Connection> {
        &self.connections
    }

    pub fn state(&self, id: &StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains_state(&self, id: &StateId) -> bool {
        self.states.contains_key(id)
    }

    pub fn contains_connection(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.connections.is_empty()
    }

    pub fn start_state(&self) -> Option<&State> {
        self.states.values().find(|s| s.is_start())
    }

    pub fn find_state_by_name(&self, name: &str) -> Option<&State> {
        self.states.values().find(|s| s.name == name)
    }

    /// Locate a trigger and its owning state.
    pub fn find_trigger(&self, id: &TriggerId) -> Option<(&State, &Trigger)> {
        self.states
            .values()
            .find_map(|s| s.trigger(id).map(|t| (s, t)))
    }

    /// Ids of every connection with `state_id` as source or target.
    pub fn connections_touching(&self, state_id: &StateId) -> Vec<ConnectionId> {
        self.connections
            .values()
            .filter(|c| c.touches(state_id))
            .map(|c| c.id.clone())
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert or overwrite a state by id (last write wins).
    ///
    /// Writing a START state demotes every other START state to NORMAL.
    pub fn upsert_state(&mut self, state: State) -> StateUpsert {
        let demoted = if state.is_start() {
            self.demote_starts_except(&state.id)
        } else {
            Vec::new()
        };
        let replaced = self.states.insert(state.id.clone(), state).is_some();
        StateUpsert { replaced, demoted }
    }

    /// Insert or overwrite a connection by id. Returns true if one was replaced.
    pub fn upsert_connection(&mut self, connection: Connection) -> bool {
        self.connections
            .insert(connection.id.clone(), connection)
            .is_some()
    }

    /// Remove a state only. Connections referencing it are left in place.
    pub fn remove_state(&mut self, id: &StateId) -> Option<State> {
        self.states.remove(id)
    }

    pub fn remove_connection(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    /// Upsert every record of `partial`; records not mentioned are kept.
    pub fn merge(&mut self, partial: Model) -> ModelMerge {
        let mut outcome = ModelMerge {
            states: partial.states.len(),
            connections: partial.connections.len(),
            demoted: Vec::new(),
        };
        for state in partial.states.into_values() {
            let upsert = self.upsert_state(state);
            outcome.demoted.extend(upsert.demoted);
        }
        for connection in partial.connections.into_values() {
            self.upsert_connection(connection);
        }
        // A state demoted early in the merge may itself have been overwritten later.
        outcome
            .demoted
            .retain(|id| self.states.get(id).is_some_and(|s| !s.is_start()));
        outcome.demoted.sort();
        outcome.demoted.dedup();
        outcome
    }

    /// Replace a trigger wherever it lives. Returns the owning state's id,
    /// or `None` if no state owns a trigger with that id.
    pub fn update_trigger(&mut self, trigger: Trigger) -> Option<StateId> {
        let owner = self
            .states
            .values()
            .find(|s| s.trigger(&trigger.id).is_some())
            .map(|s| s.id.clone())?;
        let state = self.states.get_mut(&owner)?;
        state.replace_trigger(trigger);
        Some(owner)
    }

    fn demote_starts_except(&mut self, keep: &StateId) -> Vec<StateId> {
        let mut demoted = Vec::new();
        for state in self.states.values_mut() {
            if &state.id != keep && state.is_start() {
                state.state_type = StateType::Normal;
                demoted.push(state.id.clone());
            }
        }
        demoted
    }

    // =========================================================================
    // Integrity
    // =========================================================================

    pub fn integrity_report(&self) -> IntegrityReport {
        let mut report = IntegrityReport::default();

        for conn in self.connections.values() {
            for endpoint in [conn.source_id(), conn.target_id()] {
                if !self.states.contains_key(endpoint) {
                    report.dangling.push((conn.id.clone(), endpoint.clone()));
                }
            }
        }

        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for state in self.states.values() {
            if !seen.insert(state.name.as_str()) {
                duplicates.insert(state.name.clone());
            }
        }
        report.duplicate_names = duplicates.into_iter().collect();

        let starts: Vec<StateId> = self
            .states
            .values()
            .filter(|s| s.is_start())
            .map(|s| s.id.clone())
            .collect();
        if starts.len() > 1 {
            report.extra_starts = starts;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(id: &str) -> StateId {
        StateId::from(id)
    }

    fn sample() -> Model {
        Model::from_parts(
            [
                State::with_id(sid("a"), "Start").with_type(StateType::Start),
                State::with_id(sid("b"), "Room"),
                State::with_id(sid("c"), "Cellar"),
            ],
            [
                Connection::with_id(ConnectionId::from("c1"), "go", sid("a"), sid("b")),
                Connection::with_id(ConnectionId::from("c2"), "down", sid("b"), sid("c")),
            ],
        )
    }

    #[test]
    fn when_a_second_start_is_assigned_then_the_first_is_demoted() {
        let mut model = sample();

        let upsert = model.upsert_state(State::with_id(sid("b"), "Room").with_type(StateType::Start));

        assert_eq!(upsert.demoted, vec![sid("a")]);
        assert!(upsert.replaced);
        assert_eq!(model.start_state().map(|s| s.id.clone()), Some(sid("b")));
        assert_eq!(
            model.states().values().filter(|s| s.is_start()).count(),
            1
        );
    }

    #[test]
    fn any_sequence_of_start_assignments_leaves_one_start() {
        let mut model = sample();
        for id in ["b", "c", "a", "c", "new"] {
            model.upsert_state(State::with_id(sid(id), id).with_type(StateType::Start));
            assert_eq!(model.states().values().filter(|s| s.is_start()).count(), 1);
        }
        assert_eq!(model.start_state().map(|s| s.id.clone()), Some(sid("new")));
    }

    #[test]
    fn remove_state_does_not_cascade() {
        let mut model = sample();
        assert!(model.remove_state(&sid("b")).is_some());
        assert!(model.remove_state(&sid("b")).is_none());
        assert_eq!(model.connections().len(), 2);
    }

    #[test]
    fn merge_keeps_unmentioned_records() {
        let mut model = sample();
        let partial = Model::from_parts([State::with_id(sid("b"), "Renamed room")], []);

        let outcome = model.merge(partial);

        assert_eq!(outcome.states, 1);
        assert_eq!(model.states().len(), 3);
        assert_eq!(model.state(&sid("b")).map(|s| s.name.as_str()), Some("Renamed room"));
        assert_eq!(model.connections().len(), 2);
    }

    #[test]
    fn update_trigger_finds_owning_state() {
        let mut model = sample();
        model.upsert_state(
            State::with_id(sid("b"), "Room").with_trigger(Trigger::with_id(TriggerId::from("t1"), "look")),
        );

        let owner = model.update_trigger(Trigger::with_id(TriggerId::from("t1"), "inspect"));

        assert_eq!(owner, Some(sid("b")));
        let (state, trigger) = model.find_trigger(&TriggerId::from("t1")).unwrap();
        assert_eq!(state.id, sid("b"));
        assert_eq!(trigger.name, "inspect");
        assert_eq!(model.update_trigger(Trigger::new("orphan")), None);
    }

    #[test]
    fn integrity_report_lists_dangling_endpoints_and_duplicate_names() {
        let mut model = sample();
        model.upsert_connection(Connection::with_id(
            ConnectionId::from("c3"),
            "nowhere",
            sid("c"),
            sid("missing"),
        ));
        model.upsert_state(State::with_id(sid("d"), "Room"));

        let report = model.integrity_report();

        assert_eq!(report.dangling, vec![(ConnectionId::from("c3"), sid("missing"))]);
        assert_eq!(report.duplicate_names, vec!["Room".to_string()]);
        assert!(report.extra_starts.is_empty());
        assert!(!report.is_clean());
    }

    #[test]
    fn normalized_rekeys_by_record_id_and_strips_layout() {
        let model: Model = serde_json::from_value(serde_json::json!({
            "states": {
                "wrong-key": { "id": "a", "name": "Start", "x": 10, "y": 20 }
            }
        }))
        .unwrap();

        let model = model.normalized();

        let state = model.state(&sid("a")).unwrap();
        assert!(state.extra.is_empty());
        assert!(model.connections().is_empty());
    }
}
