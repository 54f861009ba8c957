//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod fs_store;
pub mod http_store;
pub mod ports;
pub mod settings;
