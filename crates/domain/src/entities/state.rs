//! State entity - A node in the game's finite-state machine
//!
//! States carry no positional data. Where a state is drawn is a property of
//! each view, see `View::state_layouts`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{strip_layout_keys, Attributes};
use questforge_domain::{StateId, TriggerId};

use super::trigger::Trigger;

/// Role of a state in the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    #[default]
    Normal,
    /// Where a new session begins; at most one per model
    Start,
    /// Terminal state
    End,
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Start => write!(f, "START"),
            Self::End => write!(f, "END"),
        }
    }
}

/// Free-form payload a state carries for the game runtime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateUserData {
    /// Guides generative behaviour while the player is in this state
    #[serde(default)]
    pub system_prompt: String,
    #[serde(flatten)]
    pub extra: Attributes,
}

/// A node in the game's state machine.
///
/// Any attribute the surface attaches that is not modelled here is kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "stateType", default)]
    pub state_type: StateType,
    #[serde(rename = "userData", default)]
    pub user_data: StateUserData,
    #[serde(rename = "trigger", default)]
    pub triggers: Vec<Trigger>,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(StateId::new(), name)
    }

    pub fn with_id(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state_type: StateType::Normal,
            user_data: StateUserData::default(),
            triggers: Vec::new(),
            extra: Attributes::new(),
        }
    }

    pub fn with_type(mut self, state_type: StateType) -> Self {
        self.state_type = state_type;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_data.system_prompt = prompt.into();
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn is_start(&self) -> bool {
        self.state_type == StateType::Start
    }

    pub fn system_prompt(&self) -> &str {
        &self.user_data.system_prompt
    }

    pub fn trigger(&self, id: &TriggerId) -> Option<&Trigger> {
        self.triggers.iter().find(|t| &t.id == id)
    }

    /// Replace the trigger with the same id in place, keeping its position.
    /// Returns false if this state does not own such a trigger.
    pub fn replace_trigger(&mut self, trigger: Trigger) -> bool {
        match self.triggers.iter_mut().find(|t| t.id == trigger.id) {
            Some(slot) => {
                *slot = trigger;
                true
            }
            None => false,
        }
    }

    /// Drop positional keys that leaked into the pass-through attributes.
    pub fn strip_layout(&mut self) {
        strip_layout_keys(&mut self.extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_reads_surface_shape_fields() {
        let state: State = serde_json::from_value(json!({
            "id": "s1",
            "name": "Hall",
            "stateType": "START",
            "userData": { "system_prompt": "You stand in a hall." },
            "trigger": [{ "id": "t1", "name": "look" }],
            "bgColor": "#fff"
        }))
        .unwrap();

        assert_eq!(state.id.as_str(), "s1");
        assert!(state.is_start());
        assert_eq!(state.system_prompt(), "You stand in a hall.");
        assert_eq!(state.triggers.len(), 1);
        assert_eq!(state.extra.get("bgColor"), Some(&json!("#fff")));
    }

    #[test]
    fn missing_state_type_defaults_to_normal() {
        let state: State = serde_json::from_value(json!({ "id": "s1", "name": "Hall" })).unwrap();
        assert_eq!(state.state_type, StateType::Normal);
        assert!(state.triggers.is_empty());
    }

    #[test]
    fn replace_trigger_keeps_order() {
        let mut state = State::new("Hall")
            .with_trigger(Trigger::with_id(TriggerId::from("a"), "first"))
            .with_trigger(Trigger::with_id(TriggerId::from("b"), "second"));

        let replaced = state.replace_trigger(Trigger::with_id(TriggerId::from("a"), "renamed"));

        assert!(replaced);
        assert_eq!(state.triggers[0].name, "renamed");
        assert_eq!(state.triggers[1].name, "second");
        assert!(!state.replace_trigger(Trigger::with_id(TriggerId::from("zz"), "x")));
    }
}
