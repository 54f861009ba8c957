//! View repository - every layout overlay of the current game plus the
//! pointer to the active one.
//!
//! # Current view state machine
//!
//! ```text
//! unset ──load──▶ world ◀──close── encounter_<name>
//!                   └──────open──────▶
//! ```
//!
//! Re-selecting the current view is a no-op. Every other transition is
//! rejected. The target view does not have to exist yet.

use std::collections::BTreeMap;

use questforge_domain::{
    ConnectionId, DomainError, Model, Position, PrunedLayouts, Route, StateId, View, ViewId,
};

#[derive(Debug, Default)]
pub struct ViewRepository {
    views: BTreeMap<ViewId, View>,
    current_view_id: Option<ViewId>,
    revision: u64,
}

impl ViewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn views(&self) -> &BTreeMap<ViewId, View> {
        &self.views
    }

    pub fn view(&self, id: &ViewId) -> Option<&View> {
        self.views.get(id)
    }

    pub fn view_ids(&self) -> Vec<ViewId> {
        self.views.keys().cloned().collect()
    }

    pub fn current_view_id(&self) -> Option<&ViewId> {
        self.current_view_id.as_ref()
    }

    pub fn current_view(&self) -> Option<&View> {
        self.current_view_id.as_ref().and_then(|id| self.views.get(id))
    }

    pub fn encounter_views(&self) -> impl Iterator<Item = &View> {
        self.views.values().filter(|v| v.view_id.is_encounter())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // =========================================================================
    // Whole-view writes
    // =========================================================================

    /// Replace all views (load). Each view is keyed by its own id.
    pub fn set_views(&mut self, views: impl IntoIterator<Item = View>) {
        self.views = views.into_iter().map(|v| (v.view_id.clone(), v)).collect();
        self.bump();
    }

    /// Insert or replace one view under `view_id`.
    pub fn set_view(&mut self, view_id: ViewId, view: View) {
        let view = view.normalized(&view_id);
        self.views.insert(view_id, view);
        self.bump();
    }

    /// Synthesize an empty world view if there is none. Returns true if one
    /// was created.
    pub fn ensure_world(&mut self) -> bool {
        if self.views.contains_key(ViewId::WORLD) {
            return false;
        }
        self.views.insert(ViewId::world(), View::world());
        self.bump();
        true
    }

    /// Remove a view. The world view cannot be removed. If the removed view
    /// was current, the pointer falls back to world.
    pub fn remove_view(&mut self, view_id: &ViewId) -> Result<Option<View>, DomainError> {
        if view_id.is_world() {
            return Err(DomainError::constraint("The world view cannot be deleted"));
        }
        let removed = self.views.remove(view_id);
        if removed.is_some() {
            self.bump();
        }
        if self.current_view_id.as_ref() == Some(view_id) {
            self.current_view_id = Some(ViewId::world());
        }
        Ok(removed)
    }

    // =========================================================================
    // Granular writes (never auto-create a view)
    // =========================================================================

    pub fn set_state_layout(
        &mut self,
        view_id: &ViewId,
        state_id: StateId,
        position: Position,
    ) -> bool {
        let Some(view) = self.views.get_mut(view_id) else {
            return false;
        };
        view.set_state_layout(state_id, position);
        self.bump();
        true
    }

    pub fn set_connection_route(
        &mut self,
        view_id: &ViewId,
        connection_id: ConnectionId,
        route: Route,
    ) -> bool {
        let Some(view) = self.views.get_mut(view_id) else {
            return false;
        };
        view.set_connection_route(connection_id, route);
        self.bump();
        true
    }

    pub fn remove_state_from_view(&mut self, view_id: &ViewId, state_id: &StateId) -> bool {
        let removed = self
            .views
            .get_mut(view_id)
            .is_some_and(|v| v.remove_state(state_id));
        if removed {
            self.bump();
        }
        removed
    }

    pub fn remove_connection_from_view(
        &mut self,
        view_id: &ViewId,
        connection_id: &ConnectionId,
    ) -> bool {
        let removed = self
            .views
            .get_mut(view_id)
            .is_some_and(|v| v.remove_connection(connection_id));
        if removed {
            self.bump();
        }
        removed
    }

    /// Drop the state's layout from every view. Returns the views touched.
    pub fn remove_state_from_all_views(&mut self, state_id: &StateId) -> Vec<ViewId> {
        let touched: Vec<ViewId> = self
            .views
            .values_mut()
            .filter_map(|v| v.remove_state(state_id).then(|| v.view_id.clone()))
            .collect();
        if !touched.is_empty() {
            self.bump();
        }
        touched
    }

    /// Drop the connection's route from every view. Returns the views touched.
    pub fn remove_connection_from_all_views(&mut self, connection_id: &ConnectionId) -> Vec<ViewId> {
        let touched: Vec<ViewId> = self
            .views
            .values_mut()
            .filter_map(|v| v.remove_connection(connection_id).then(|| v.view_id.clone()))
            .collect();
        if !touched.is_empty() {
            self.bump();
        }
        touched
    }

    /// Prune every view against the model. Only views that lost entries are
    /// returned.
    pub fn prune_orphans(&mut self, model: &Model) -> Vec<(ViewId, PrunedLayouts)> {
        let pruned: Vec<(ViewId, PrunedLayouts)> = self
            .views
            .values_mut()
            .map(|v| (v.view_id.clone(), v.prune_orphans(model)))
            .filter(|(_, p)| !p.is_empty())
            .collect();
        if !pruned.is_empty() {
            self.bump();
        }
        pruned
    }

    // =========================================================================
    // Current view
    // =========================================================================

    pub fn set_current_view(&mut self, target: ViewId) -> Result<(), DomainError> {
        let allowed = match (&self.current_view_id, &target) {
            (Some(current), target) if current == target => true,
            (_, target) if target.is_world() => true,
            (Some(current), target) => current.is_world() && target.is_encounter(),
            (None, _) => false,
        };
        if !allowed {
            return Err(DomainError::invalid_state_transition(format!(
                "Cannot switch current view from {} to {}",
                self.current_view_id
                    .as_ref()
                    .map(ViewId::as_str)
                    .unwrap_or("<unset>"),
                target
            )));
        }
        self.current_view_id = Some(target);
        Ok(())
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questforge_domain::{Connection, State};

    fn repo_with_world_and_cave() -> ViewRepository {
        let mut repo = ViewRepository::new();
        let mut world = View::world();
        world.set_state_layout(StateId::from("a"), Position::new(0.0, 0.0));
        world.set_state_layout(StateId::from("b"), Position::new(100.0, 0.0));
        world.set_connection_route(ConnectionId::from("c1"), Route::default());
        let mut cave = View::encounter("cave");
        cave.set_state_layout(StateId::from("a"), Position::new(5.0, 5.0));
        repo.set_views([world, cave]);
        repo
    }

    #[test]
    fn granular_writes_never_create_views() {
        let mut repo = ViewRepository::new();

        let written = repo.set_state_layout(
            &ViewId::encounter("ghost"),
            StateId::from("a"),
            Position::default(),
        );

        assert!(!written);
        assert!(repo.views().is_empty());
        assert!(!repo.set_connection_route(
            &ViewId::world(),
            ConnectionId::from("c1"),
            Route::default()
        ));
    }

    #[test]
    fn ensure_world_synthesizes_only_once() {
        let mut repo = ViewRepository::new();
        assert!(repo.ensure_world());
        assert!(!repo.ensure_world());
        assert_eq!(repo.view(&ViewId::world()), Some(&View::world()));
    }

    #[test]
    fn remove_state_from_all_views_touches_every_view() {
        let mut repo = repo_with_world_and_cave();

        let touched = repo.remove_state_from_all_views(&StateId::from("a"));

        assert_eq!(touched.len(), 2);
        assert!(repo
            .views()
            .values()
            .all(|v| !v.is_state_visible(&StateId::from("a"))));
        assert!(repo.remove_state_from_all_views(&StateId::from("a")).is_empty());
    }

    #[test]
    fn granular_removes_are_idempotent() {
        let mut repo = repo_with_world_and_cave();
        assert!(repo.remove_connection_from_view(&ViewId::world(), &ConnectionId::from("c1")));
        assert!(!repo.remove_connection_from_view(&ViewId::world(), &ConnectionId::from("c1")));
        assert!(!repo.remove_connection_from_view(&ViewId::encounter("none"), &ConnectionId::from("c1")));
        assert!(repo.remove_state_from_view(&ViewId::encounter("cave"), &StateId::from("a")));
        assert!(!repo.remove_state_from_view(&ViewId::encounter("cave"), &StateId::from("a")));
        assert!(!repo.remove_state_from_view(&ViewId::encounter("none"), &StateId::from("a")));
        assert!(repo.view(&ViewId::world()).is_some_and(|w| w.is_state_visible(&StateId::from("a"))));
    }

    #[test]
    fn current_view_follows_the_allowed_transitions() {
        let mut repo = repo_with_world_and_cave();
        assert!(repo.current_view_id().is_none());
        assert!(repo.set_current_view(ViewId::encounter("cave")).is_err());

        repo.set_current_view(ViewId::world()).unwrap();
        repo.set_current_view(ViewId::encounter("cave")).unwrap();
        assert!(repo.set_current_view(ViewId::encounter("other")).is_err());
        repo.set_current_view(ViewId::encounter("cave")).unwrap();
        repo.set_current_view(ViewId::world()).unwrap();

        assert_eq!(repo.current_view_id(), Some(&ViewId::world()));
    }

    #[test]
    fn switching_to_a_view_that_does_not_exist_yet_is_accepted() {
        let mut repo = ViewRepository::new();
        repo.set_current_view(ViewId::world()).unwrap();
        repo.set_current_view(ViewId::encounter("later")).unwrap();
        assert!(repo.current_view().is_none());
    }

    #[test]
    fn ids_outside_both_families_are_rejected() {
        let mut repo = ViewRepository::new();
        repo.set_current_view(ViewId::world()).unwrap();
        let err = repo.set_current_view(ViewId::from("sketch")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }

    #[test]
    fn removing_current_encounter_falls_back_to_world() {
        let mut repo = repo_with_world_and_cave();
        repo.set_current_view(ViewId::world()).unwrap();
        repo.set_current_view(ViewId::encounter("cave")).unwrap();

        let removed = repo.remove_view(&ViewId::encounter("cave")).unwrap();

        assert!(removed.is_some());
        assert_eq!(repo.current_view_id(), Some(&ViewId::world()));
        assert!(repo.remove_view(&ViewId::world()).is_err());
    }

    #[test]
    fn prune_orphans_reports_per_view() {
        let mut repo = repo_with_world_and_cave();
        let model = Model::from_parts(
            [State::with_id(StateId::from("a"), "A")],
            std::iter::empty::<Connection>(),
        );

        let pruned = repo.prune_orphans(&model);

        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].0, ViewId::world());
        assert_eq!(pruned[0].1.states, vec![StateId::from("b")]);
        assert_eq!(pruned[0].1.connections, vec![ConnectionId::from("c1")]);
    }
}
