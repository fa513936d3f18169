//! # Managed Resources
//!
//! One module per tracker object. Each supplies a [`ResourceKind`] marker, its
//! state record, the pure payload builder and mapper, and the two hook
//! constructors (`hooks` for the lifecycle, `list_hooks` for enumeration).
//!
//! All four share [`TrackerResource`], which binds a runner and a listing into
//! a [`ManagedResource`].

pub mod field;
pub mod project;
pub mod project_category;
pub mod work_type;

pub use field::{Field, FieldState};
pub use project::{Project, ProjectState};
pub use project_category::{ProjectCategory, ProjectCategoryState};
pub use work_type::{WorkType, WorkTypeState};

use crate::model::SearchPage;
use clap::ValueEnum;
use crud_engine::{
    classify_response, ApiOutcome, ClassifyOptions, CrudHooks, CrudRunner, Diagnostics,
    ListHooks, ManagedResource, Page, ResourceKind, Value,
};
use std::fmt;
use std::time::Duration;

/// The closed set of resource kinds this provider manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ResourceType {
    WorkType,
    Project,
    ProjectCategory,
    Field,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::WorkType,
        ResourceType::Project,
        ResourceType::ProjectCategory,
        ResourceType::Field,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            ResourceType::WorkType => WorkType::TYPE_NAME,
            ResourceType::Project => Project::TYPE_NAME,
            ResourceType::ProjectCategory => ProjectCategory::TYPE_NAME,
            ResourceType::Field => Field::TYPE_NAME,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A resource whose listing yields remote models keyed by id and mapped to state records.
pub struct TrackerResource<K: ResourceKind> {
    runner: CrudRunner<K>,
    listing: ListHooks<K::Model, K::State>,
}

impl<K: ResourceKind> TrackerResource<K> {
    pub fn new(
        hooks: CrudHooks<K>,
        listing: ListHooks<K::Model, K::State>,
        operation_timeout: Option<Duration>,
    ) -> Self {
        let mut runner = CrudRunner::new(hooks);
        if let Some(timeout) = operation_timeout {
            runner = runner.with_operation_timeout(timeout);
        }
        Self { runner, listing }
    }
}

impl<K: ResourceKind> fmt::Debug for TrackerResource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerResource")
            .field("runner", &self.runner)
            .field("listing", &self.listing)
            .finish()
    }
}

impl<K: ResourceKind> ManagedResource<K> for TrackerResource<K> {
    type Item = K::Model;
    type Listed = K::State;

    fn runner(&self) -> &CrudRunner<K> {
        &self.runner
    }

    fn list_hooks(&self) -> &ListHooks<K::Model, K::State> {
        &self.listing
    }
}

/// A required string attribute; records an error when it is not known.
pub(crate) fn required(value: &Value<String>, attribute: &str, diags: &mut Diagnostics) -> Option<String> {
    match value.as_known() {
        Some(v) if !v.is_empty() => Some(v.clone()),
        _ => {
            diags.add_error(
                "Missing required attribute",
                format!("`{attribute}` must be set to a non-empty value."),
            );
            None
        }
    }
}

/// Runs a state mapper on a fresh record for a listing entry.
pub(crate) fn listed<M, S: Default>(
    model: M,
    diags: &mut Diagnostics,
    map: fn(M, &mut S, &mut Diagnostics),
) -> Option<S> {
    let mut state = S::default();
    let mut local = Diagnostics::new();
    map(model, &mut state, &mut local);
    let failed = local.has_error();
    diags.extend(local);
    (!failed).then_some(state)
}

/// Classifies a bulk listing call.
pub(crate) fn all_items<M>(label: &str, outcome: ApiOutcome<Vec<M>>) -> (Vec<M>, Diagnostics) {
    let mut diags = classify_response(
        label,
        outcome.meta.as_ref(),
        outcome.error.as_ref(),
        &ClassifyOptions::for_read(),
    );
    if diags.has_error() {
        return (Vec::new(), diags);
    }
    match outcome.model {
        Some(items) => (items, diags),
        None => {
            diags.add_error(
                format!("{label} failed: empty response"),
                format!("HTTP status: {}", outcome.status()),
            );
            (Vec::new(), diags)
        }
    }
}

/// Classifies one page of a paged listing.
pub(crate) fn page_of<M>(label: &str, outcome: ApiOutcome<SearchPage<M>>) -> Page<M> {
    let (mut pages, diags) = all_items(label, outcome.map(|page| vec![page]));
    if diags.has_error() {
        return Page::failed(diags);
    }
    let Some(page) = pages.pop() else {
        return Page::failed(diags);
    };
    let mut out = Page::new(page.values, page.is_last);
    out.diags = diags;
    out
}
