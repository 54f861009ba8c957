//! Model repository - the single in-memory home of the canonical graph.

use questforge_domain::{
    Connection, ConnectionId, Model, ModelMerge, State, StateId, StateUpsert, Trigger,
};

/// Owns the current game's [`Model`].
///
/// Every write bumps `revision`, which the orchestrator compares against the
/// revision it last saved to report unsaved changes. Removals of unknown
/// ids are no-ops and do not bump the revision.
#[derive(Debug, Default)]
pub struct ModelRepository {
    model: Model,
    revision: u64,
}

impl ModelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// An owned copy for readers that must not hold the lock.
    pub fn snapshot(&self) -> Model {
        self.model.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the graph wholesale (load).
    pub fn set_model(&mut self, model: Model) {
        self.model = model;
        self.bump();
    }

    pub fn upsert_state(&mut self, state: State) -> StateUpsert {
        let outcome = self.model.upsert_state(state);
        self.bump();
        outcome
    }

    pub fn upsert_connection(&mut self, connection: Connection) -> bool {
        let replaced = self.model.upsert_connection(connection);
        self.bump();
        replaced
    }

    /// Remove the state only. Cascading into connections and views is the
    /// orchestrator's job.
    pub fn remove_state(&mut self, id: &StateId) -> Option<State> {
        let removed = self.model.remove_state(id);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    pub fn remove_connection(&mut self, id: &ConnectionId) -> Option<Connection> {
        let removed = self.model.remove_connection(id);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    /// Upsert every record of a partial model, keeping the rest.
    pub fn merge(&mut self, partial: Model) -> ModelMerge {
        let outcome = self.model.merge(partial);
        if outcome.states > 0 || outcome.connections > 0 {
            self.bump();
        }
        outcome
    }

    /// Replace a trigger in whichever state owns it.
    pub fn update_trigger(&mut self, trigger: Trigger) -> Option<StateId> {
        let owner = self.model.update_trigger(trigger);
        if owner.is_some() {
            self.bump();
        }
        owner
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questforge_domain::StateType;

    #[test]
    fn set_model_replaces_everything() {
        let mut repo = ModelRepository::new();
        repo.upsert_state(State::with_id(StateId::from("old"), "Old"));

        repo.set_model(Model::from_parts([State::with_id(StateId::from("a"), "A")], []));

        assert!(repo.model().state(&StateId::from("old")).is_none());
        assert!(repo.model().state(&StateId::from("a")).is_some());
    }

    #[test]
    fn set_model_tolerates_empty_maps() {
        let mut repo = ModelRepository::new();
        repo.set_model(Model::new());
        assert!(repo.model().is_empty());
    }

    #[test]
    fn upsert_is_last_write_wins() {
        let mut repo = ModelRepository::new();
        let id = StateId::from("a");
        repo.upsert_state(State::with_id(id.clone(), "First").with_system_prompt("keep me?"));

        repo.upsert_state(State::with_id(id.clone(), "Second"));

        let state = repo.model().state(&id).unwrap();
        assert_eq!(state.name, "Second");
        assert_eq!(state.system_prompt(), "");
    }

    #[test]
    fn start_assignment_goes_through_demotion() {
        let mut repo = ModelRepository::new();
        repo.upsert_state(State::with_id(StateId::from("a"), "A").with_type(StateType::Start));

        let outcome =
            repo.upsert_state(State::with_id(StateId::from("b"), "B").with_type(StateType::Start));

        assert_eq!(outcome.demoted, vec![StateId::from("a")]);
    }

    #[test]
    fn removing_missing_ids_is_a_silent_no_op() {
        let mut repo = ModelRepository::new();
        let before = repo.revision();

        assert!(repo.remove_state(&StateId::from("nope")).is_none());
        assert!(repo.remove_connection(&ConnectionId::from("nope")).is_none());

        assert_eq!(repo.revision(), before);
    }

    #[test]
    fn remove_connection_does_not_touch_states() {
        let mut repo = ModelRepository::new();
        repo.set_model(Model::from_parts(
            [
                State::with_id(StateId::from("a"), "A"),
                State::with_id(StateId::from("b"), "B"),
            ],
            [Connection::with_id(
                ConnectionId::from("c1"),
                "go",
                StateId::from("a"),
                StateId::from("b"),
            )],
        ));

        repo.remove_connection(&ConnectionId::from("c1"));

        assert_eq!(repo.model().states().len(), 2);
        assert!(repo.model().connections().is_empty());
    }
}
