//! # ResourceKind Trait
//!
//! Binds the three types one resource moves between:
//!
//! - `State`: the declarative view (plan / tracked state record),
//! - `Payload`: the request body for create and update,
//! - `Model`: the response body returned by the remote service.
//!
//! [`CrudHooks`](crate::CrudHooks) and [`CrudRunner`](crate::CrudRunner) are
//! generic over a `ResourceKind`, and every hook signature is written in terms
//! of its associated types. A project hook set therefore cannot be handed a
//! field payload: the mismatch is a compile error, not a runtime surprise.

use std::fmt::Debug;

/// Type family of one managed resource.
///
/// Implemented on a zero-sized marker type per resource:
///
/// ```rust
/// use crud_engine::{ResourceKind, Value};
///
/// #[derive(Debug, Default, Clone)]
/// struct TeamState { id: Value<String>, name: Value<String> }
/// #[derive(Debug)] struct TeamPayload { name: String }
/// #[derive(Debug)] struct TeamModel { id: String, name: String }
///
/// struct Team;
/// impl ResourceKind for Team {
///     type State = TeamState;
///     type Payload = TeamPayload;
///     type Model = TeamModel;
///     const TYPE_NAME: &'static str = "tracker_team";
/// }
/// ```
pub trait ResourceKind: Send + Sync + 'static {
    /// Zero-valued on construction; filled by the plan/state accessors.
    type State: Default + Debug + Send + Sync + 'static;
    type Payload: Debug + Send + 'static;
    type Model: Debug + Send + 'static;

    /// Name used in logs and diagnostics (e.g. `tracker_project`).
    const TYPE_NAME: &'static str;
}
