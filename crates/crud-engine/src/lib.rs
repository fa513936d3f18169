//! # CRUD Engine
//!
//! A small runtime that expresses the Create / Read / Update / Delete / Import /
//! List lifecycle of a declaratively managed remote object **once**, and lets
//! each concrete resource plug in only its data mapping and API-call glue.
//!
//! ## Architecture Overview
//!
//! The engine separates concerns into three layers:
//!
//! 1. **Type layer** ([`ResourceKind`]) binds a resource's state, payload and
//!    model types into one family, so hooks for one resource cannot be wired to
//!    another resource's types.
//! 2. **Hook layer** ([`CrudHooks`], [`ListHooks`]) holds the resource-specific
//!    closures: payload builder, remote calls, identifier extractor, mapper.
//! 3. **Driver layer** ([`CrudRunner`], [`do_list`]) sequences those hooks,
//!    classifies every remote response with [`classify_response`], and reports
//!    the result as [`Diagnostics`].
//!
//! ```text
//!  StateAccess ──get_plan/get_state──▶ CrudRunner ──hooks──▶ remote call
//!       ▲                                  │                     │
//!       └──────────set_state/remove────────┘◀──── classifier ◀───┘
//! ```
//!
//! ## Failure Reporting
//!
//! Lifecycle operations return [`Diagnostics`], never `Result`. A diagnostic is
//! either a warning (surfaced, never aborts) or an error (stops the operation).
//! Callers check [`Diagnostics::has_error`] before trusting any state written
//! through their [`StateAccess`].
//!
//! Every diagnostic built from remote data passes through [`redact`] first.
//!
//! ## Concurrency
//!
//! Hook sets are immutable after construction and shared behind `Arc`. Each
//! operation works only on its own freshly built state record, so concurrent
//! operations on the same runner never share mutable data.
//!
//! ## Testing
//!
//! See the [`mock`] module for scripted remote calls and recording accessors.

pub mod access;
pub mod classify;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod kind;
pub mod list;
pub mod mock;
pub mod redact;
pub mod resource;
pub mod response;
pub mod runner;
pub mod tracing;
pub mod value;

pub use access::{StateAccess, TrackedState};
pub use classify::{classify_response, default_classifier, is_success, Classifier, ClassifyOptions};
pub use context::OpContext;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::ApiError;
pub use hooks::{CrudHooks, Operation};
pub use kind::ResourceKind;
pub use list::{do_list, ListHooks, ListOptions, Page};
pub use redact::redact;
pub use resource::ManagedResource;
pub use response::{http_status, ApiOutcome, ResponseMeta};
pub use runner::CrudRunner;
pub use value::Value;
