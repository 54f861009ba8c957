//! Questforge Shared - Wire vocabulary for the drawing surface
//!
//! This crate contains the types exchanged with the embedded surface:
//! - Flat diagram records (`StateShape`, `TriggerConnection`, `Raft`)
//! - Surface → host and host → surface message enums
//! - The `Origin` provenance tag used for echo suppression
//!
//! # Design Principles
//!
//! 1. **No business logic** - Pure data types and serialization
//! 2. **Domain entities inside** - records flatten domain entities rather than
//!    duplicating their fields

pub mod diagram;
pub mod messages;

pub use diagram::{DiagramRecord, FlatDiagram, ShapeKind, StateShape, TriggerConnection};
pub use messages::{HostMessage, Origin, ProtocolError, ShapePatch, SurfaceMessage};
