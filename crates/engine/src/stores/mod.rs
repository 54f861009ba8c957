//! In-memory state storage modules.
//!
//! Stores hold the editing session's mutable state:
//! - `ModelRepository` - the canonical state graph
//! - `ViewRepository` - layout overlays and the current-view pointer
//!
//! Both are plain synchronous structs. They are shared behind
//! `tokio::sync::RwLock`; when both are needed, lock the model first.

pub mod model;
pub mod views;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use model::ModelRepository;
pub use views::ViewRepository;

pub type SharedModel = Arc<RwLock<ModelRepository>>;
pub type SharedViews = Arc<RwLock<ViewRepository>>;
