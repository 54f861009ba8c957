use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::{Attributes, Position};
use questforge_domain::RaftId;

/// A freestanding grouping decoration drawn beneath the states of a view.
///
/// Rafts are pure layout: they belong to a single view and never to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raft {
    pub id: RaftId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(rename = "userData", default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Value>,
    #[serde(default)]
    pub labels: Vec<Value>,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl Raft {
    pub fn new(position: Position, width: f64, height: f64) -> Self {
        Self {
            id: RaftId::new(),
            x: position.x,
            y: position.y,
            width,
            height,
            user_data: None,
            labels: Vec::new(),
            extra: Attributes::new(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}
