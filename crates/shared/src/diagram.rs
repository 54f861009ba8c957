//! Flat diagram records
//!
//! The drawing surface only understands one format: an ordered array of
//! figures, each carrying semantic and positional fields together and
//! tagged by `type`. A model and a view are never sent on their own, only
//! composed into this shape.

use serde::{Deserialize, Serialize};

use questforge_domain::{Connection, Position, Raft, Route, State};

/// A state figure: the state's semantic fields plus its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateShape {
    #[serde(flatten)]
    pub state: State,
    pub x: f64,
    pub y: f64,
}

impl StateShape {
    pub fn new(state: State, position: Position) -> Self {
        Self {
            state,
            x: position.x,
            y: position.y,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A connection figure: the connection's semantic fields plus its route.
// `route` is declared first so it claims `vertex`/`routingMetaData` before
// the connection's pass-through attributes see the remaining keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConnection {
    #[serde(flatten)]
    pub route: Route,
    #[serde(flatten)]
    pub connection: Connection,
}

impl TriggerConnection {
    pub fn new(connection: Connection, route: Route) -> Self {
        Self { connection, route }
    }
}

/// One figure of a flat diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DiagramRecord {
    StateShape(StateShape),
    TriggerConnection(TriggerConnection),
    Raft(Raft),
    /// Figure kinds we neither compose nor extract
    #[serde(other)]
    Unknown,
}

impl DiagramRecord {
    /// The record's id, if it is a kind we model.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::StateShape(shape) => Some(shape.state.id.as_str()),
            Self::TriggerConnection(conn) => Some(conn.connection.id.as_str()),
            Self::Raft(raft) => Some(raft.id.as_str()),
            Self::Unknown => None,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::StateShape(_) => ShapeKind::StateShape,
            Self::TriggerConnection(_) => ShapeKind::TriggerConnection,
            Self::Raft(_) => ShapeKind::Raft,
            Self::Unknown => ShapeKind::Other,
        }
    }
}

/// The wire format exchanged with the surface.
pub type FlatDiagram = Vec<DiagramRecord>;

/// Figure kinds named in selection messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    StateShape,
    TriggerConnection,
    TriggerLabel,
    Raft,
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use questforge_domain::{ConnectionId, StateId, StateType};
    use serde_json::json;

    #[test]
    fn state_shape_is_one_flat_object() {
        let state = State::with_id(StateId::from("a"), "Start").with_type(StateType::Start);
        let record = DiagramRecord::StateShape(StateShape::new(state, Position::new(0.0, 10.0)));

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], json!("StateShape"));
        assert_eq!(json["id"], json!("a"));
        assert_eq!(json["stateType"], json!("START"));
        assert_eq!(json["x"], json!(0.0));
        assert_eq!(json["y"], json!(10.0));
    }

    #[test]
    fn trigger_connection_reads_vertex_and_routing_metadata() {
        let record: DiagramRecord = serde_json::from_value(json!({
            "type": "TriggerConnection",
            "id": "c1",
            "name": "go",
            "source": { "node": "a", "port": "out" },
            "target": { "node": "b", "port": "in" },
            "vertex": [{ "x": 1, "y": 2 }, { "x": 3, "y": 4 }],
            "routingMetaData": { "routedByUserInteraction": true }
        }))
        .unwrap();

        let DiagramRecord::TriggerConnection(conn) = record else {
            panic!("expected a connection record");
        };
        assert_eq!(conn.connection.id, ConnectionId::from("c1"));
        assert_eq!(conn.route.vertices.len(), 2);
        assert!(conn.route.routing_meta_data.is_some());
        assert!(conn.connection.extra.is_empty());
    }

    #[test]
    fn unknown_figure_kinds_are_tolerated() {
        let diagram: FlatDiagram = serde_json::from_value(json!([
            { "type": "draw2d.shape.note.PostIt", "id": "n1", "text": "todo" },
            { "type": "Raft", "id": "r1", "x": 0, "y": 0, "width": 50, "height": 40 }
        ]))
        .unwrap();

        assert_eq!(diagram[0], DiagramRecord::Unknown);
        assert_eq!(diagram[1].kind(), ShapeKind::Raft);
        assert_eq!(diagram[1].id(), Some("r1"));
    }
}
