//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! the model or a view was modified.

pub mod model_events;
pub mod view_events;

pub use model_events::*;
pub use view_events::*;
