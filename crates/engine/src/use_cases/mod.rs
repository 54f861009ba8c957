//! Use cases - User story orchestration.
//!
//! - `game` - load/save sequencing, orphan sweeps, cascading deletes, encounters
//! - `bridge` - synchronisation with the drawing surface

pub mod bridge;
pub mod game;

pub use bridge::{BridgeError, DiagramBridge};
pub use game::{GameError, GameOrchestrator};
