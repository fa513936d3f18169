//! Remote call adapters, one per resource, on top of a shared [`TrackerClient`].
//!
//! Every adapter method returns an [`ApiOutcome`](crud_engine::ApiOutcome) and
//! takes the operation context by reference so cancellation reaches the socket.

pub mod field;
pub mod http;
pub mod project;
pub mod project_category;
pub mod work_type;

pub use field::FieldClient;
pub use http::TrackerClient;
pub use project::ProjectClient;
pub use project_category::ProjectCategoryClient;
pub use work_type::WorkTypeClient;
