extern crate self as questforge_domain;

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use aggregates::{EncounterConfig, IntegrityReport, Model, View, ViewLayout, ViewType};
pub use entities::{
    Connection, ConnectionUserData, Endpoint, Raft, State, StateType, StateUserData, Trigger,
};
pub use error::DomainError;
pub use events::{ModelMerge, PrunedLayouts, StateUpsert};
pub use ids::{ConnectionId, RaftId, StateId, TriggerId, ViewId};
pub use value_objects::{Attributes, GameName, Position, Route, SoundEffect};
