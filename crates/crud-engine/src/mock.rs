//! # Test Doubles
//!
//! Scripted remote calls and recording accessors for exercising the runner
//! without a network.
//!
//! | Double | Stands in for | Records |
//! |--------|---------------|---------|
//! | [`MockApi`] | the four remote calls and the post-call hooks | each call, in order |
//! | [`RecordingState`] | the plan/state accessors | a counter per accessor |
//! | [`recording_classifier`] | the default classifier | each label it was invoked with |
//!
//! All three can share one [`CallLog`], which gives tests a single ordered
//! trace of everything that happened during an operation.
//!
//! ```rust
//! use crud_engine::mock::{recording_classifier, ApiCall, CallLog, MockApi, RecordingState};
//! use crud_engine::{CrudHooks, CrudRunner, OpContext, ResourceKind};
//!
//! #[derive(Debug, Default, Clone)] struct NoteState { id: String }
//! #[derive(Debug, Clone)] struct Note { id: String }
//! struct NoteKind;
//! impl ResourceKind for NoteKind {
//!     type State = NoteState; type Payload = (); type Model = Note;
//!     const TYPE_NAME: &'static str = "tracker_note";
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let log = CallLog::new();
//! let api = MockApi::<Note>::new(log.clone());
//! api.expect(ApiCall::Read).return_status(404);
//!
//! let hooks = api.wire(
//!     CrudHooks::<NoteKind>::new()
//!         .extract_id(|s| s.id.clone())
//!         .map_to_state(|m, s, _| s.id = m.id),
//! );
//! let runner = CrudRunner::new(hooks).with_classifier(recording_classifier(log.clone()));
//!
//! let mut state = RecordingState::with_tracked(NoteState { id: "n-1".into() }, log.clone());
//! let diags = runner.read(&OpContext::new(), &mut state).await;
//!
//! assert!(diags.is_empty());
//! assert_eq!(state.remove_calls, 1);
//! assert_eq!(log.count_prefix("classify:"), 0);
//! api.verify();
//! # }
//! ```

use crate::access::{StateAccess, TrackedState};
use crate::classify::{classify_response, Classifier};
use crate::context::OpContext;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ApiError;
use crate::hooks::CrudHooks;
use crate::kind::ResourceKind;
use crate::response::{ApiOutcome, ResponseMeta};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// CALL LOG
// =============================================================================

/// Shared, ordered trace of calls made during a test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        lock(&self.0).iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        lock(&self.0).iter().filter(|e| e.starts_with(prefix)).count()
    }

    /// Entries that start with `prefix`, with the prefix stripped.
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        lock(&self.0)
            .iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_string))
            .collect()
    }
}

/// A classifier that records `classify:<label>` and then delegates to the default one.
pub fn recording_classifier(log: CallLog) -> Classifier {
    Arc::new(move |label, meta, err, opts| {
        log.record(format!("classify:{label}"));
        classify_response(label, meta, err, opts)
    })
}

// =============================================================================
// SCRIPTED REMOTE CALLS
// =============================================================================

/// Remote call slots a [`MockApi`] can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCall {
    Create,
    Read,
    Update,
    Delete,
    PostCreate,
    PostRead,
    PostUpdate,
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiCall::Create => "create",
            ApiCall::Read => "read",
            ApiCall::Update => "update",
            ApiCall::Delete => "delete",
            ApiCall::PostCreate => "post_create",
            ApiCall::PostRead => "post_read",
            ApiCall::PostUpdate => "post_update",
        };
        f.write_str(name)
    }
}

struct Expectation<M> {
    call: ApiCall,
    outcome: ApiOutcome<M>,
}

/// Remote calls answered from an ordered queue of expectations.
///
/// Each call pops the front expectation and panics if it is for a different
/// slot, so a test fails loudly when the runner calls out of order.
pub struct MockApi<M> {
    expectations: Arc<Mutex<VecDeque<Expectation<M>>>>,
    log: CallLog,
}

impl<M> Clone for MockApi<M> {
    fn clone(&self) -> Self {
        Self {
            expectations: Arc::clone(&self.expectations),
            log: self.log.clone(),
        }
    }
}

impl<M: Send + 'static> MockApi<M> {
    pub fn new(log: CallLog) -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            log,
        }
    }

    pub fn expect(&self, call: ApiCall) -> ExpectationBuilder<M> {
        ExpectationBuilder {
            call,
            expectations: Arc::clone(&self.expectations),
        }
    }

    /// Answers the next call, which must be for `call`.
    pub fn next(&self, call: ApiCall) -> ApiOutcome<M> {
        self.log.record(format!("api:{call}"));
        let expectation = lock(&self.expectations).pop_front();
        match expectation {
            Some(exp) if exp.call == call => exp.outcome,
            Some(exp) => panic!("unexpected {call} call; next expectation is {}", exp.call),
            None => panic!("unexpected {call} call; no expectations left"),
        }
    }

    /// Number of times `call` was served.
    pub fn calls(&self, call: ApiCall) -> usize {
        self.log.count(&format!("api:{call}"))
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }

    /// Installs the four primary remote calls on `hooks`.
    pub fn wire<K>(&self, hooks: CrudHooks<K>) -> CrudHooks<K>
    where
        K: ResourceKind<Model = M>,
    {
        let (create, read, update, delete) = (self.clone(), self.clone(), self.clone(), self.clone());
        hooks
            .create(move |_ctx, _payload| {
                let outcome = create.next(ApiCall::Create);
                async move { outcome }
            })
            .read(move |_ctx, _id| {
                let outcome = read.next(ApiCall::Read);
                async move { outcome }
            })
            .update(move |_ctx, _id, _payload| {
                let outcome = update.next(ApiCall::Update);
                async move { outcome }
            })
            .delete(move |_ctx, _id, _state| {
                let outcome = delete.next(ApiCall::Delete).map(|_| ());
                async move { outcome }
            })
    }

    /// Installs a post-call hook in the slot named by `call`.
    pub fn wire_post<K>(&self, hooks: CrudHooks<K>, call: ApiCall) -> CrudHooks<K>
    where
        K: ResourceKind<Model = M>,
    {
        let api = self.clone();
        let hook = move |_ctx: OpContext, _model: M| {
            let outcome = api.next(call);
            async move { outcome }
        };
        match call {
            ApiCall::PostCreate => hooks.post_create(hook),
            ApiCall::PostRead => hooks.post_read(hook),
            ApiCall::PostUpdate => hooks.post_update(hook),
            other => panic!("{other} is not a post-call hook"),
        }
    }
}

/// Builder for one scripted answer.
pub struct ExpectationBuilder<M> {
    call: ApiCall,
    expectations: Arc<Mutex<VecDeque<Expectation<M>>>>,
}

impl<M> ExpectationBuilder<M> {
    /// Answer with a decoded body and `status`.
    pub fn return_ok(self, model: M, status: u16) {
        self.return_outcome(ApiOutcome::ok(model, ResponseMeta::new(status)));
    }

    /// Answer with a bare status and no body.
    pub fn return_status(self, status: u16) {
        self.return_outcome(ApiOutcome::status_only(ResponseMeta::new(status)));
    }

    /// Answer with a transport failure.
    pub fn return_err(self, error: ApiError) {
        self.return_outcome(ApiOutcome::failed(error));
    }

    pub fn return_outcome(self, outcome: ApiOutcome<M>) {
        lock(&self.expectations).push_back(Expectation {
            call: self.call,
            outcome,
        });
    }
}

// =============================================================================
// RECORDING STATE ACCESSOR
// =============================================================================

/// An in-memory accessor that counts every callback and can be told to fail.
#[derive(Debug)]
pub struct RecordingState<S> {
    inner: TrackedState<S>,
    log: CallLog,
    fail_get: bool,
    fail_set: bool,
    pub get_plan_calls: usize,
    pub get_state_calls: usize,
    pub set_state_calls: usize,
    pub remove_calls: usize,
}

impl<S: Clone + Send> RecordingState<S> {
    fn from_inner(inner: TrackedState<S>, log: CallLog) -> Self {
        Self {
            inner,
            log,
            fail_get: false,
            fail_set: false,
            get_plan_calls: 0,
            get_state_calls: 0,
            set_state_calls: 0,
            remove_calls: 0,
        }
    }

    pub fn empty(log: CallLog) -> Self {
        Self::from_inner(TrackedState::new(), log)
    }

    pub fn with_plan(plan: S, log: CallLog) -> Self {
        Self::from_inner(TrackedState::with_plan(plan), log)
    }

    pub fn with_tracked(tracked: S, log: CallLog) -> Self {
        Self::from_inner(TrackedState::with_tracked(tracked), log)
    }

    /// Make `get_plan` and `get_state` return an error.
    pub fn failing_get(mut self) -> Self {
        self.fail_get = true;
        self
    }

    /// Make `set_state` return an error.
    pub fn failing_set(mut self) -> Self {
        self.fail_set = true;
        self
    }

    pub fn tracked(&self) -> Option<&S> {
        self.inner.tracked()
    }
}

impl<S: Clone + Send> StateAccess<S> for RecordingState<S> {
    fn get_plan(&mut self, ctx: &OpContext, state: &mut S) -> Diagnostics {
        self.get_plan_calls += 1;
        self.log.record("get_plan");
        if self.fail_get {
            return Diagnostics::from(Diagnostic::error("plan unavailable", "injected failure"));
        }
        self.inner.get_plan(ctx, state)
    }

    fn get_state(&mut self, ctx: &OpContext, state: &mut S) -> Diagnostics {
        self.get_state_calls += 1;
        self.log.record("get_state");
        if self.fail_get {
            return Diagnostics::from(Diagnostic::error("state unavailable", "injected failure"));
        }
        self.inner.get_state(ctx, state)
    }

    fn set_state(&mut self, ctx: &OpContext, state: &S) -> Diagnostics {
        self.set_state_calls += 1;
        self.log.record("set_state");
        if self.fail_set {
            return Diagnostics::from(Diagnostic::error("state not saved", "injected failure"));
        }
        self.inner.set_state(ctx, state)
    }

    fn remove(&mut self, ctx: &OpContext) {
        self.remove_calls += 1;
        self.log.record("remove");
        self.inner.remove(ctx);
    }
}
