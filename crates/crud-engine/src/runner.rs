//! # CRUD Runner
//!
//! `CrudRunner<K>` drives the five lifecycle operations for one resource kind by
//! composing a [`StateAccess`] implementation with the resource's [`CrudHooks`].
//!
//! Every operation follows the same discipline:
//!
//! * the capability check runs first, so a missing hook is reported before any I/O;
//! * diagnostics from every step accumulate into one collection, and the first
//!   fatal diagnostic stops progress;
//! * every remote call passes through the classifier before anything else looks
//!   at its result, and state is mapped and persisted only after that.
//!
//! | Operation | Steps |
//! |-----------|-------|
//! | create | plan, build payload, create call, post-create, map, set |
//! | read   | state, extract id, read call (404 removes and stops), post-read, map, set |
//! | update | plan, extract id, build payload, update call, post-update, map, set |
//! | delete | state, extract id, delete call |
//! | import | read call by import id, post-read, map, set |
//!
//! The runner makes at most one primary remote call per invocation and never
//! retries. It reports failures only through the returned [`Diagnostics`]; its
//! tracing output is limited to a span per operation and debug events.

use crate::access::StateAccess;
use crate::classify::{default_classifier, Classifier, ClassifyOptions};
use crate::context::OpContext;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::hooks::{BuildFn, CrudHooks, MapFn, Operation, PostFn};
use crate::kind::ResourceKind;
use crate::response::ApiOutcome;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const LABEL_CREATE: &str = "create resource";
pub const LABEL_READ: &str = "read resource";
pub const LABEL_UPDATE: &str = "update resource";
pub const LABEL_DELETE: &str = "delete resource";
pub const LABEL_IMPORT: &str = "import resource";
pub const LABEL_POST_CREATE: &str = "post-create hook";
pub const LABEL_POST_READ: &str = "post-read hook";
pub const LABEL_POST_UPDATE: &str = "post-update hook";

/// Generic lifecycle driver for one resource kind.
///
/// Cheap to clone: the hook set is shared behind an `Arc` and never mutated,
/// so one runner can serve any number of concurrent operations.
pub struct CrudRunner<K: ResourceKind> {
    hooks: Arc<CrudHooks<K>>,
    classifier: Classifier,
    operation_timeout: Option<Duration>,
}

impl<K: ResourceKind> Clone for CrudRunner<K> {
    fn clone(&self) -> Self {
        Self {
            hooks: Arc::clone(&self.hooks),
            classifier: Arc::clone(&self.classifier),
            operation_timeout: self.operation_timeout,
        }
    }
}

impl<K: ResourceKind> fmt::Debug for CrudRunner<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudRunner")
            .field("hooks", &self.hooks)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl<K: ResourceKind> CrudRunner<K> {
    pub fn new(hooks: CrudHooks<K>) -> Self {
        Self::from_shared(Arc::new(hooks))
    }

    pub fn from_shared(hooks: Arc<CrudHooks<K>>) -> Self {
        Self {
            hooks,
            classifier: default_classifier(),
            operation_timeout: None,
        }
    }

    /// Replaces the default classifier.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Bounds each whole operation, post-call hooks included. Zero disables the bound.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn hooks(&self) -> &CrudHooks<K> {
        &self.hooks
    }

    pub fn supports(&self, op: Operation) -> bool {
        self.hooks.supports(op)
    }

    #[instrument(name = "create", skip_all, fields(resource = K::TYPE_NAME))]
    pub async fn create<A>(&self, ctx: &OpContext, access: &mut A) -> Diagnostics
    where
        A: StateAccess<K::State> + ?Sized,
    {
        let hooks = &*self.hooks;
        let (Some(build), Some(create), Some(map)) = (
            hooks.build_payload.as_ref(),
            hooks.create.as_ref(),
            hooks.map_to_state.as_ref(),
        ) else {
            return self.unsupported(Operation::Create);
        };

        let ctx = self.scoped(ctx);
        let mut diags = Diagnostics::new();
        let mut state = K::State::default();

        diags.extend(access.get_plan(&ctx, &mut state));
        if diags.has_error() {
            return diags;
        }

        let Some(payload) = self.build(build, &state, &mut diags) else {
            return diags;
        };

        debug!("calling create");
        let outcome = self.call(&ctx, create(ctx.clone(), payload)).await;
        let opts = self.options(self.acceptable(ClassifyOptions::for_create(), &hooks.create_statuses));
        let Some(model) = self.confirm(LABEL_CREATE, outcome, &opts, &mut diags) else {
            return diags;
        };

        let Some(model) = self
            .follow_up(&ctx, hooks.post_create.as_ref(), LABEL_POST_CREATE, model, &mut diags)
            .await
        else {
            return diags;
        };

        self.map_and_set(map, model, &mut state, access, &ctx, &mut diags);
        diags
    }

    #[instrument(name = "read", skip_all, fields(resource = K::TYPE_NAME))]
    pub async fn read<A>(&self, ctx: &OpContext, access: &mut A) -> Diagnostics
    where
        A: StateAccess<K::State> + ?Sized,
    {
        let hooks = &*self.hooks;
        let (Some(extract_id), Some(read), Some(map)) = (
            hooks.extract_id.as_ref(),
            hooks.read.as_ref(),
            hooks.map_to_state.as_ref(),
        ) else {
            return self.unsupported(Operation::Read);
        };

        let ctx = self.scoped(ctx);
        let mut diags = Diagnostics::new();
        let mut state = K::State::default();

        diags.extend(access.get_state(&ctx, &mut state));
        if diags.has_error() {
            return diags;
        }

        let id = extract_id(&state);
        if id.is_empty() {
            diags.add_error(
                format!("Missing {} identifier", K::TYPE_NAME),
                "The tracked state has no identifier, so the remote object cannot be read.",
            );
            return diags;
        }

        debug!(%id, "calling read");
        let outcome = self.call(&ctx, read(ctx.clone(), id)).await;
        if outcome.status() == 404 {
            debug!("remote object is gone; dropping tracked state");
            access.remove(&ctx);
            return diags;
        }

        let opts = self.options(ClassifyOptions::for_read());
        let Some(model) = self.confirm(LABEL_READ, outcome, &opts, &mut diags) else {
            return diags;
        };

        let Some(model) = self
            .follow_up(&ctx, hooks.post_read.as_ref(), LABEL_POST_READ, model, &mut diags)
            .await
        else {
            return diags;
        };

        self.map_and_set(map, model, &mut state, access, &ctx, &mut diags);
        diags
    }

    #[instrument(name = "update", skip_all, fields(resource = K::TYPE_NAME))]
    pub async fn update<A>(&self, ctx: &OpContext, access: &mut A) -> Diagnostics
    where
        A: StateAccess<K::State> + ?Sized,
    {
        let hooks = &*self.hooks;
        let (Some(extract_id), Some(build), Some(update), Some(map)) = (
            hooks.extract_id.as_ref(),
            hooks.build_payload.as_ref(),
            hooks.update.as_ref(),
            hooks.map_to_state.as_ref(),
        ) else {
            return self.unsupported(Operation::Update);
        };

        let ctx = self.scoped(ctx);
        let mut diags = Diagnostics::new();
        let mut state = K::State::default();

        diags.extend(access.get_plan(&ctx, &mut state));
        if diags.has_error() {
            return diags;
        }

        let id = extract_id(&state);
        if id.is_empty() {
            diags.add_error(
                format!("Missing {} identifier", K::TYPE_NAME),
                "The planned state has no identifier, so the remote object cannot be updated.",
            );
            return diags;
        }

        let Some(payload) = self.build(build, &state, &mut diags) else {
            return diags;
        };

        debug!(%id, "calling update");
        let outcome = self.call(&ctx, update(ctx.clone(), id, payload)).await;
        let opts = self.options(self.acceptable(ClassifyOptions::for_update(), &hooks.update_statuses));
        let Some(model) = self.confirm(LABEL_UPDATE, outcome, &opts, &mut diags) else {
            return diags;
        };

        let Some(model) = self
            .follow_up(&ctx, hooks.post_update.as_ref(), LABEL_POST_UPDATE, model, &mut diags)
            .await
        else {
            return diags;
        };

        self.map_and_set(map, model, &mut state, access, &ctx, &mut diags);
        diags
    }

    #[instrument(name = "delete", skip_all, fields(resource = K::TYPE_NAME))]
    pub async fn delete<A>(&self, ctx: &OpContext, access: &mut A) -> Diagnostics
    where
        A: StateAccess<K::State> + ?Sized,
    {
        let hooks = &*self.hooks;
        let (Some(extract_id), Some(delete)) = (hooks.extract_id.as_ref(), hooks.delete.as_ref())
        else {
            return self.unsupported(Operation::Delete);
        };

        let ctx = self.scoped(ctx);
        let mut diags = Diagnostics::new();
        let mut state = K::State::default();

        diags.extend(access.get_state(&ctx, &mut state));
        if diags.has_error() {
            return diags;
        }

        let id = extract_id(&state);
        if id.is_empty() {
            diags.add_error(
                format!("Missing {} identifier", K::TYPE_NAME),
                "The tracked state has no identifier, so the remote object cannot be deleted.",
            );
            return diags;
        }

        debug!(%id, "calling delete");
        let outcome = self.call(&ctx, delete(ctx.clone(), id, &state)).await;
        let opts = self.options(self.acceptable(
            ClassifyOptions::for_delete(hooks.treat_delete_404_as_success),
            &hooks.delete_statuses,
        ));
        diags.extend((self.classifier)(
            LABEL_DELETE,
            outcome.meta.as_ref(),
            outcome.error.as_ref(),
            &opts,
        ));
        diags
    }

    /// Brings an existing remote object under management by its identifier.
    ///
    /// There is no tracked record yet, so a 404 here is an ordinary failure.
    #[instrument(name = "import", skip_all, fields(resource = K::TYPE_NAME, id = import_id))]
    pub async fn import<A>(&self, ctx: &OpContext, import_id: &str, access: &mut A) -> Diagnostics
    where
        A: StateAccess<K::State> + ?Sized,
    {
        let hooks = &*self.hooks;
        let (Some(read), Some(map)) = (hooks.read.as_ref(), hooks.map_to_state.as_ref()) else {
            return self.unsupported(Operation::Import);
        };

        let ctx = self.scoped(ctx);
        let mut diags = Diagnostics::new();
        if import_id.is_empty() {
            diags.add_error(
                format!("Missing {} identifier", K::TYPE_NAME),
                "An identifier is required to import an existing object.",
            );
            return diags;
        }

        debug!("calling read for import");
        let outcome = self.call(&ctx, read(ctx.clone(), import_id.to_string())).await;
        let opts = self.options(ClassifyOptions::for_read());
        let Some(model) = self.confirm(LABEL_IMPORT, outcome, &opts, &mut diags) else {
            return diags;
        };

        let Some(model) = self
            .follow_up(&ctx, hooks.post_read.as_ref(), LABEL_POST_READ, model, &mut diags)
            .await
        else {
            return diags;
        };

        let mut state = K::State::default();
        self.map_and_set(map, model, &mut state, access, &ctx, &mut diags);
        diags
    }

    fn unsupported(&self, op: Operation) -> Diagnostics {
        let missing = self.hooks.missing_for(op).join(", ");
        Diagnostics::from(Diagnostic::error(
            format!("{} does not support {op}", K::TYPE_NAME),
            format!("The resource is missing required hooks: {missing}. This is a provider configuration error."),
        ))
    }

    fn scoped(&self, ctx: &OpContext) -> OpContext {
        match self.operation_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.clone(),
        }
    }

    fn acceptable(&self, base: ClassifyOptions, overrides: &Option<Vec<u16>>) -> ClassifyOptions {
        match overrides {
            Some(statuses) => base.with_acceptable(statuses.clone()),
            None => base,
        }
    }

    fn options(&self, base: ClassifyOptions) -> ClassifyOptions {
        if self.hooks.include_response_body {
            base.with_headers().with_body(None)
        } else {
            base
        }
    }

    fn build(
        &self,
        build: &BuildFn<K>,
        state: &K::State,
        diags: &mut Diagnostics,
    ) -> Option<K::Payload> {
        let mut build_diags = Diagnostics::new();
        let payload = build(state, &mut build_diags);
        let failed = build_diags.has_error();
        diags.extend(build_diags);
        match payload {
            Some(payload) if !failed => Some(payload),
            Some(_) => None,
            None => {
                if !failed {
                    diags.add_error(
                        format!("Unable to build {} request", K::TYPE_NAME),
                        "The payload builder produced no request body.",
                    );
                }
                None
            }
        }
    }

    /// Races the remote call against the operation context.
    async fn call<M>(&self, ctx: &OpContext, fut: BoxFuture<'static, ApiOutcome<M>>) -> ApiOutcome<M> {
        ctx.run(fut).await.unwrap_or_else(ApiOutcome::failed)
    }

    /// Classifies a call and hands back its model when it succeeded.
    fn confirm(
        &self,
        label: &str,
        outcome: ApiOutcome<K::Model>,
        opts: &ClassifyOptions,
        diags: &mut Diagnostics,
    ) -> Option<K::Model> {
        let verdict = (self.classifier)(label, outcome.meta.as_ref(), outcome.error.as_ref(), opts);
        let failed = verdict.has_error();
        diags.extend(verdict);
        if failed {
            return None;
        }
        if outcome.model.is_none() {
            diags.add_error(
                format!("{label} failed: empty response"),
                format!(
                    "HTTP status: {}\nThe call succeeded but returned no {} body.",
                    outcome.status(),
                    K::TYPE_NAME
                ),
            );
        }
        outcome.model
    }

    async fn follow_up(
        &self,
        ctx: &OpContext,
        hook: Option<&PostFn<K>>,
        label: &str,
        model: K::Model,
        diags: &mut Diagnostics,
    ) -> Option<K::Model> {
        let Some(hook) = hook else {
            return Some(model);
        };
        debug!(hook = label, "running follow-up call");
        let outcome = self.call(ctx, hook(ctx.clone(), model)).await;
        let opts = self.options(ClassifyOptions::for_read());
        self.confirm(label, outcome, &opts, diags)
    }

    fn map_and_set<A>(
        &self,
        map: &MapFn<K>,
        model: K::Model,
        state: &mut K::State,
        access: &mut A,
        ctx: &OpContext,
        diags: &mut Diagnostics,
    ) where
        A: StateAccess<K::State> + ?Sized,
    {
        let mut map_diags = Diagnostics::new();
        map(model, state, &mut map_diags);
        let failed = map_diags.has_error();
        diags.extend(map_diags);
        if failed {
            debug!("mapping failed; state not persisted");
            return;
        }
        diags.extend(access.set_state(ctx, state));
    }
}
