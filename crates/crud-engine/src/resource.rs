//! # ManagedResource Trait
//!
//! Gives each concrete resource the full lifecycle surface for free: implement
//! the two accessors and `create`, `read`, `update`, `delete`, `import` and
//! `list` are provided on top of the generic runner and aggregator.
use crate::access::StateAccess;
use crate::context::OpContext;
use crate::diagnostics::Diagnostics;
use crate::kind::ResourceKind;
use crate::list::{do_list, ListHooks, ListOptions};
use crate::runner::CrudRunner;
use async_trait::async_trait;
use std::collections::HashMap;

/// Lifecycle surface of one managed resource.
///
/// # Example
///
/// ```rust
/// use crud_engine::{
///     ApiOutcome, CrudHooks, CrudRunner, Diagnostics, ListHooks, ManagedResource, OpContext,
///     ResourceKind, ResponseMeta, TrackedState,
/// };
///
/// #[derive(Debug, Default, Clone)]
/// struct TagState { id: String, label: String }
/// #[derive(Debug)] struct TagPayload { label: String }
/// #[derive(Debug, Clone)] struct TagModel { id: String, label: String }
///
/// struct Tag;
/// impl ResourceKind for Tag {
///     type State = TagState;
///     type Payload = TagPayload;
///     type Model = TagModel;
///     const TYPE_NAME: &'static str = "tracker_tag";
/// }
///
/// struct TagResource {
///     runner: CrudRunner<Tag>,
///     listing: ListHooks<TagModel, TagState>,
/// }
///
/// impl ManagedResource<Tag> for TagResource {
///     type Item = TagModel;
///     type Listed = TagState;
///
///     fn runner(&self) -> &CrudRunner<Tag> { &self.runner }
///     fn list_hooks(&self) -> &ListHooks<TagModel, TagState> { &self.listing }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let hooks = CrudHooks::<Tag>::new()
///     .build_payload(|state, _| Some(TagPayload { label: state.label.clone() }))
///     .create(|_ctx, payload| async move {
///         ApiOutcome::ok(TagModel { id: "7".into(), label: payload.label }, ResponseMeta::new(201))
///     })
///     .map_to_state(|model, state, _| { state.id = model.id; state.label = model.label; });
/// let listing = ListHooks::unpaged(|_ctx| async { (Vec::new(), Diagnostics::new()) })
///     .key_of(|m: &TagModel| m.id.clone())
///     .map_to_out(|m: TagModel, _| Some(TagState { id: m.id, label: m.label }));
/// let tags = TagResource { runner: CrudRunner::new(hooks), listing };
///
/// let mut access = TrackedState::with_plan(TagState { id: String::new(), label: "ops".into() });
/// let diags = tags.create(&OpContext::new(), &mut access).await;
/// assert!(diags.is_empty());
/// assert_eq!(access.tracked().map(|s| s.id.as_str()), Some("7"));
/// # }
/// ```
#[async_trait]
pub trait ManagedResource<K: ResourceKind>: Send + Sync {
    /// Raw item produced by the listing.
    type Item: Send + 'static;
    /// Value stored per key in the listing result.
    type Listed: Send + 'static;

    fn runner(&self) -> &CrudRunner<K>;

    fn list_hooks(&self) -> &ListHooks<Self::Item, Self::Listed>;

    async fn create(&self, ctx: &OpContext, access: &mut dyn StateAccess<K::State>) -> Diagnostics {
        self.runner().create(ctx, access).await
    }

    async fn read(&self, ctx: &OpContext, access: &mut dyn StateAccess<K::State>) -> Diagnostics {
        self.runner().read(ctx, access).await
    }

    async fn update(&self, ctx: &OpContext, access: &mut dyn StateAccess<K::State>) -> Diagnostics {
        self.runner().update(ctx, access).await
    }

    async fn delete(&self, ctx: &OpContext, access: &mut dyn StateAccess<K::State>) -> Diagnostics {
        self.runner().delete(ctx, access).await
    }

    async fn import(
        &self,
        ctx: &OpContext,
        id: &str,
        access: &mut dyn StateAccess<K::State>,
    ) -> Diagnostics {
        self.runner().import(ctx, id, access).await
    }

    async fn list(
        &self,
        ctx: &OpContext,
        opts: ListOptions,
    ) -> (Option<HashMap<String, Self::Listed>>, Diagnostics) {
        do_list(ctx, self.list_hooks(), &opts).await
    }
}
