//! Model mutation outcomes
//!
//! These types tell callers what a write actually changed so they can log,
//! or re-sync the surface.

use crate::StateId;

/// Outcome of inserting or overwriting a state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateUpsert {
    /// An existing state with the same id was overwritten
    pub replaced: bool,
    /// Other states demoted from START to NORMAL by this write
    pub demoted: Vec<StateId>,
}

/// Outcome of folding a partial model into the current one
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelMerge {
    pub states: usize,
    pub connections: usize,
    /// States demoted from START to NORMAL while merging
    pub demoted: Vec<StateId>,
}
