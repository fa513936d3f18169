//! # Hook Set
//!
//! The per-resource bundle of closures the runner composes: a payload builder,
//! the four remote calls, an identifier extractor, the result mapper, optional
//! post-call hooks and the per-operation status policy.
//!
//! A hook set is built once when the resource is configured and then shared
//! read-only (behind an `Arc`) by every concurrent operation on that resource.

use crate::context::OpContext;
use crate::diagnostics::Diagnostics;
use crate::kind::ResourceKind;
use crate::response::ApiOutcome;
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub(crate) type BuildFn<K> = Arc<
    dyn Fn(&<K as ResourceKind>::State, &mut Diagnostics) -> Option<<K as ResourceKind>::Payload>
        + Send
        + Sync,
>;
pub(crate) type CreateFn<K> = Arc<
    dyn Fn(OpContext, <K as ResourceKind>::Payload) -> BoxFuture<'static, ApiOutcome<<K as ResourceKind>::Model>>
        + Send
        + Sync,
>;
pub(crate) type ReadFn<K> = Arc<
    dyn Fn(OpContext, String) -> BoxFuture<'static, ApiOutcome<<K as ResourceKind>::Model>>
        + Send
        + Sync,
>;
pub(crate) type UpdateFn<K> = Arc<
    dyn Fn(
            OpContext,
            String,
            <K as ResourceKind>::Payload,
        ) -> BoxFuture<'static, ApiOutcome<<K as ResourceKind>::Model>>
        + Send
        + Sync,
>;
pub(crate) type DeleteFn<K> = Arc<
    dyn Fn(OpContext, String, &<K as ResourceKind>::State) -> BoxFuture<'static, ApiOutcome<()>>
        + Send
        + Sync,
>;
pub(crate) type PostFn<K> = Arc<
    dyn Fn(
            OpContext,
            <K as ResourceKind>::Model,
        ) -> BoxFuture<'static, ApiOutcome<<K as ResourceKind>::Model>>
        + Send
        + Sync,
>;
pub(crate) type ExtractIdFn<K> = Arc<dyn Fn(&<K as ResourceKind>::State) -> String + Send + Sync>;
pub(crate) type MapFn<K> = Arc<
    dyn Fn(<K as ResourceKind>::Model, &mut <K as ResourceKind>::State, &mut Diagnostics)
        + Send
        + Sync,
>;

/// Lifecycle operation, used for capability checks and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hooks wiring one [`ResourceKind`] into the generic runner.
pub struct CrudHooks<K: ResourceKind> {
    pub(crate) build_payload: Option<BuildFn<K>>,
    pub(crate) create: Option<CreateFn<K>>,
    pub(crate) read: Option<ReadFn<K>>,
    pub(crate) update: Option<UpdateFn<K>>,
    pub(crate) delete: Option<DeleteFn<K>>,
    pub(crate) extract_id: Option<ExtractIdFn<K>>,
    pub(crate) map_to_state: Option<MapFn<K>>,
    pub(crate) post_create: Option<PostFn<K>>,
    pub(crate) post_read: Option<PostFn<K>>,
    pub(crate) post_update: Option<PostFn<K>>,
    pub(crate) create_statuses: Option<Vec<u16>>,
    pub(crate) update_statuses: Option<Vec<u16>>,
    pub(crate) delete_statuses: Option<Vec<u16>>,
    pub(crate) treat_delete_404_as_success: bool,
    pub(crate) include_response_body: bool,
}

impl<K: ResourceKind> Default for CrudHooks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ResourceKind> CrudHooks<K> {
    pub fn new() -> Self {
        Self {
            build_payload: None,
            create: None,
            read: None,
            update: None,
            delete: None,
            extract_id: None,
            map_to_state: None,
            post_create: None,
            post_read: None,
            post_update: None,
            create_statuses: None,
            update_statuses: None,
            delete_statuses: None,
            treat_delete_404_as_success: false,
            include_response_body: false,
        }
    }

    /// Pure transform from state to request body. Must not perform I/O.
    pub fn build_payload<F>(mut self, f: F) -> Self
    where
        F: Fn(&K::State, &mut Diagnostics) -> Option<K::Payload> + Send + Sync + 'static,
    {
        self.build_payload = Some(Arc::new(f));
        self
    }

    pub fn create<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OpContext, K::Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiOutcome<K::Model>> + Send + 'static,
    {
        self.create = Some(Arc::new(move |ctx, payload| f(ctx, payload).boxed()));
        self
    }

    pub fn read<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OpContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiOutcome<K::Model>> + Send + 'static,
    {
        self.read = Some(Arc::new(move |ctx, id| f(ctx, id).boxed()));
        self
    }

    pub fn update<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OpContext, String, K::Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiOutcome<K::Model>> + Send + 'static,
    {
        self.update = Some(Arc::new(move |ctx, id, payload| {
            f(ctx, id, payload).boxed()
        }));
        self
    }

    /// The current state is passed so that local-only preferences can shape the call.
    pub fn delete<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OpContext, String, &K::State) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiOutcome<()>> + Send + 'static,
    {
        self.delete = Some(Arc::new(move |ctx, id, state| f(ctx, id, state).boxed()));
        self
    }

    pub fn extract_id<F>(mut self, f: F) -> Self
    where
        F: Fn(&K::State) -> String + Send + Sync + 'static,
    {
        self.extract_id = Some(Arc::new(f));
        self
    }

    /// Rebuilds remote-echoed fields from the model; local-only fields must be left as found.
    pub fn map_to_state<F>(mut self, f: F) -> Self
    where
        F: Fn(K::Model, &mut K::State, &mut Diagnostics) + Send + Sync + 'static,
    {
        self.map_to_state = Some(Arc::new(f));
        self
    }

    pub fn post_create<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OpContext, K::Model) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiOutcome<K::Model>> + Send + 'static,
    {
        self.post_create = Some(Arc::new(move |ctx, model| f(ctx, model).boxed()));
        self
    }

    pub fn post_read<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OpContext, K::Model) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiOutcome<K::Model>> + Send + 'static,
    {
        self.post_read = Some(Arc::new(move |ctx, model| f(ctx, model).boxed()));
        self
    }

    pub fn post_update<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(OpContext, K::Model) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiOutcome<K::Model>> + Send + 'static,
    {
        self.post_update = Some(Arc::new(move |ctx, model| f(ctx, model).boxed()));
        self
    }

    /// Replaces the default `{200, 201}` allow-list for create.
    pub fn acceptable_create_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.create_statuses = Some(statuses);
        self
    }

    /// Replaces the default `{200, 204}` allow-list for update.
    pub fn acceptable_update_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.update_statuses = Some(statuses);
        self
    }

    /// Replaces the default `{200, 204}` allow-list for delete.
    pub fn acceptable_delete_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.delete_statuses = Some(statuses);
        self
    }

    pub fn treat_delete_404_as_success(mut self, yes: bool) -> Self {
        self.treat_delete_404_as_success = yes;
        self
    }

    /// Include a truncated, redacted response body in failure details.
    pub fn include_response_body(mut self, yes: bool) -> Self {
        self.include_response_body = yes;
        self
    }

    /// Names of the hooks an operation needs but this set lacks.
    pub fn missing_for(&self, op: Operation) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let mut need = |present: bool, name: &'static str| {
            if !present {
                missing.push(name);
            }
        };
        match op {
            Operation::Create => {
                need(self.build_payload.is_some(), "build_payload");
                need(self.create.is_some(), "create");
                need(self.map_to_state.is_some(), "map_to_state");
            }
            Operation::Read => {
                need(self.extract_id.is_some(), "extract_id");
                need(self.read.is_some(), "read");
                need(self.map_to_state.is_some(), "map_to_state");
            }
            Operation::Update => {
                need(self.extract_id.is_some(), "extract_id");
                need(self.build_payload.is_some(), "build_payload");
                need(self.update.is_some(), "update");
                need(self.map_to_state.is_some(), "map_to_state");
            }
            Operation::Delete => {
                need(self.extract_id.is_some(), "extract_id");
                need(self.delete.is_some(), "delete");
            }
            Operation::Import => {
                need(self.read.is_some(), "read");
                need(self.map_to_state.is_some(), "map_to_state");
            }
        }
        missing
    }

    pub fn supports(&self, op: Operation) -> bool {
        self.missing_for(op).is_empty()
    }
}

impl<K: ResourceKind> fmt::Debug for CrudHooks<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudHooks")
            .field("resource", &K::TYPE_NAME)
            .field("create", &self.supports(Operation::Create))
            .field("read", &self.supports(Operation::Read))
            .field("update", &self.supports(Operation::Update))
            .field("delete", &self.supports(Operation::Delete))
            .field("post_create", &self.post_create.is_some())
            .field("post_read", &self.post_read.is_some())
            .field("post_update", &self.post_update.is_some())
            .field("treat_delete_404_as_success", &self.treat_delete_404_as_success)
            .finish()
    }
}
