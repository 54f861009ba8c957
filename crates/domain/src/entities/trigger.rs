use serde::{Deserialize, Serialize};

use crate::value_objects::{Attributes, SoundEffect};
use questforge_domain::TriggerId;

/// A player action available while in the owning state.
///
/// `conditions` and `actions` are script expressions evaluated by the game
/// runtime; the editor stores them verbatim and in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(flatten)]
    pub sound: SoundEffect,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl Trigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(TriggerId::new(), name)
    }

    pub fn with_id(id: TriggerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            system_prompt: String::new(),
            sound: SoundEffect::default(),
            conditions: Vec::new(),
            actions: Vec::new(),
            extra: Attributes::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sound_effect_defaults_apply_when_absent() {
        let trigger: Trigger = serde_json::from_value(json!({
            "id": "t1",
            "name": "open door",
            "sound_effect": "global/door.mp3"
        }))
        .unwrap();

        assert_eq!(trigger.sound.name, "global/door.mp3");
        assert_eq!(trigger.sound.duration, 2.0);
        assert_eq!(trigger.sound.volume, 100.0);
        assert!(trigger.extra.is_empty());
    }

    #[test]
    fn sound_fields_serialize_flat() {
        let trigger = Trigger::with_id(TriggerId::from("t1"), "knock").with_action("knocked = true");
        let json = serde_json::to_value(&trigger).unwrap();

        assert_eq!(json["sound_effect"], json!(""));
        assert_eq!(json["sound_effect_volume"], json!(100.0));
        assert_eq!(json["actions"], json!(["knocked = true"]));
    }
}
