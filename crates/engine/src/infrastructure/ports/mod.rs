//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Game persistence (could swap filesystem -> remote HTTP store)
//! - Delivery to connected surfaces (WebSocket hub, or a mock in tests)

mod error;
mod external;
mod repos;
pub mod types;

pub use error::RepoError;
pub use external::SurfaceSink;
pub use repos::GameStore;
pub use types::{EditorEvent, ImportCandidate};

#[cfg(test)]
pub use external::MockSurfaceSink;
#[cfg(test)]
pub use repos::MockGameStore;
