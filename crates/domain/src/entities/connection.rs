//! Connection entity - A directed edge between two states

use serde::{Deserialize, Serialize};

use crate::value_objects::{strip_layout_keys, Attributes, SoundEffect};
use questforge_domain::{ConnectionId, StateId};

/// One end of a connection: the state plus the anchor it is attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: StateId,
    /// Sub-anchor on the state figure (port name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl Endpoint {
    pub fn new(node: StateId) -> Self {
        Self {
            node,
            port: None,
            name: None,
            extra: Attributes::new(),
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }
}

/// Edge-attached logic; mirrors a trigger's payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionUserData {
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub sound: SoundEffect,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(flatten)]
    pub extra: Attributes,
}

/// A directed edge between two states, fired by the trigger named `name`.
///
/// Endpoints are not checked against the model on write. A connection whose
/// endpoint is missing never renders and is reported by
/// `Model::integrity_report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    #[serde(default)]
    pub name: String,
    pub source: Endpoint,
    pub target: Endpoint,
    #[serde(rename = "userData", default)]
    pub user_data: ConnectionUserData,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl Connection {
    pub fn new(name: impl Into<String>, source: StateId, target: StateId) -> Self {
        Self::with_id(ConnectionId::new(), name, source, target)
    }

    pub fn with_id(
        id: ConnectionId,
        name: impl Into<String>,
        source: StateId,
        target: StateId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            source: Endpoint::new(source),
            target: Endpoint::new(target),
            user_data: ConnectionUserData::default(),
            extra: Attributes::new(),
        }
    }

    pub fn source_id(&self) -> &StateId {
        &self.source.node
    }

    pub fn target_id(&self) -> &StateId {
        &self.target.node
    }

    /// True if either endpoint is `state_id`.
    pub fn touches(&self, state_id: &StateId) -> bool {
        self.source_id() == state_id || self.target_id() == state_id
    }

    pub fn strip_layout(&mut self) {
        strip_layout_keys(&mut self.extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connection_reads_surface_fields() {
        let conn: Connection = serde_json::from_value(json!({
            "id": "c1",
            "name": "open door",
            "source": { "node": "a", "port": "output0" },
            "target": { "node": "b", "port": "input0", "decoration": "arrow" },
            "userData": { "description": "the door creaks", "conditions": ["has_key"] }
        }))
        .unwrap();

        assert_eq!(conn.source_id().as_str(), "a");
        assert_eq!(conn.source.port.as_deref(), Some("output0"));
        assert_eq!(conn.target.extra.get("decoration"), Some(&json!("arrow")));
        assert_eq!(conn.user_data.conditions, vec!["has_key".to_string()]);
        assert_eq!(conn.user_data.sound.volume, 100.0);
    }

    #[test]
    fn touches_checks_both_endpoints() {
        let conn = Connection::new("go", StateId::from("a"), StateId::from("b"));
        assert!(conn.touches(&StateId::from("a")));
        assert!(conn.touches(&StateId::from("b")));
        assert!(!conn.touches(&StateId::from("c")));
    }
}
