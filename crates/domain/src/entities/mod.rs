//! Domain entities - Graph nodes, edges and their decorations

mod connection;
mod raft;
mod state;
mod trigger;

pub use connection::{Connection, ConnectionUserData, Endpoint};
pub use raft::Raft;
pub use state::{State, StateType, StateUserData};
pub use trigger::Trigger;
