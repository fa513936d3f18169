//! # Tracker Provider
//!
//! Declarative management of issue-tracker configuration objects (work types,
//! projects, project categories and custom fields) on top of the
//! [`crud_engine`] lifecycle runtime.
//!
//! The engine owns the lifecycle: sequencing, response classification,
//! not-found handling and truncation warnings. This crate owns only what is
//! specific to the tracker:
//!
//! ## Module Tour
//!
//! ### 1. Configuration ([`config`])
//! Layered settings (defaults, TOML file, `TRACKER_*` environment, explicit
//! overrides) validated into a [`ProviderConfig`](config::ProviderConfig).
//!
//! ### 2. Remote calls ([`clients`])
//! A `reqwest` client for the REST v3 API and one adapter per resource. Every
//! adapter returns an [`ApiOutcome`](crud_engine::ApiOutcome); statuses are
//! reported, never turned into errors.
//!
//! ### 3. Wire formats ([`model`])
//! Serde models and payloads.
//!
//! ### 4. Resources ([`resources`])
//! One [`ResourceKind`](crud_engine::ResourceKind) per object with its state
//! record, payload builder, mapper and hook sets.
//!
//! ### 5. Wiring ([`runtime`])
//! [`Provider`](runtime::Provider) builds everything once from a config.
//!
//! ## Running
//!
//! ```bash
//! TRACKER_ENDPOINT=https://acme.example.net TRACKER_API_TOKEN=... \
//!     RUST_LOG=debug cargo run -- list project --max-items 50
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod model;
pub mod resources;
pub mod runtime;

pub use config::{ConfigOverrides, ProviderConfig};
pub use error::ConfigError;
pub use resources::ResourceType;
pub use runtime::Provider;
