//! Aggregate roots - the model graph and its view overlays
//!
//! Mutations return outcome types from `crate::events` describing what
//! changed, so callers can cascade or log without re-diffing.

pub mod model;
pub mod view;

pub use model::{IntegrityReport, Model};
pub use view::{EncounterConfig, View, ViewLayout, ViewType};
