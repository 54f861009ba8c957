//! View mutation outcomes

use crate::{ConnectionId, StateId};

/// Layout entries removed from one view because the model no longer has
/// the entity they position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrunedLayouts {
    pub states: Vec<StateId>,
    pub connections: Vec<ConnectionId>,
}

impl PrunedLayouts {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.connections.is_empty()
    }
}
