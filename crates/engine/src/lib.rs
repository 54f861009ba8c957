//! Questforge Engine library.
//!
//! Server-side core of the visual game editor.
//!
//! ## Structure
//!
//! - `stores/` - Model and View repositories (in-memory session state)
//! - `composer/` - Pure composition of model + view into a flat diagram, and back
//! - `use_cases/` - Game orchestration and the diagram bridge
//! - `infrastructure/` - Persistence adapters, settings, port traits
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod composer;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
