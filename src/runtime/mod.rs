//! Runtime wiring.
//!
//! - [`Provider`] builds the shared API client once and wires every managed
//!   resource to it.
//! - [`setup_tracing`] re-exports the engine's subscriber setup for binaries.

pub mod provider;

pub use crud_engine::tracing::setup_tracing;
pub use provider::*;
