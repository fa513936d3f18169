use crate::clients::{
    FieldClient, ProjectCategoryClient, ProjectClient, TrackerClient, WorkTypeClient,
};
use crate::config::ProviderConfig;
use crate::error::ConfigError;
use crate::resources::{
    field, project, project_category, work_type, Field, Project, ProjectCategory, ResourceType,
    TrackerResource, WorkType,
};
use crud_engine::{
    Diagnostics, ListOptions, ManagedResource, OpContext, ResourceKind, TrackedState,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// The configured provider: one API client shared by the four managed resources.
///
/// Hook sets are built here once and never change afterwards, so a `Provider`
/// can serve any number of concurrent operations.
///
/// # Example
///
/// ```ignore
/// let config = ProviderConfig::load(Some(Path::new("tracker.toml")), &ConfigOverrides::default())?;
/// let provider = Provider::configure(config)?;
///
/// let mut access = TrackedState::with_plan(planned_project);
/// let diags = provider.projects.create(&OpContext::new(), &mut access).await;
/// ```
#[derive(Debug)]
pub struct Provider {
    pub work_types: TrackerResource<WorkType>,
    pub projects: TrackerResource<Project>,
    pub project_categories: TrackerResource<ProjectCategory>,
    pub fields: TrackerResource<Field>,
}

impl Provider {
    /// Builds the HTTP client and wires every resource to it.
    ///
    /// This is the only fallible step; lifecycle operations afterwards report
    /// through diagnostics.
    pub fn configure(config: ProviderConfig) -> Result<Self, ConfigError> {
        let client = Arc::new(TrackerClient::new(&config)?);
        let timeout = config.operation_timeout;

        let work_types = WorkTypeClient::new(Arc::clone(&client));
        let projects = ProjectClient::new(Arc::clone(&client));
        let categories = ProjectCategoryClient::new(Arc::clone(&client));
        let fields = FieldClient::new(client);

        info!(endpoint = %config.endpoint, "provider configured");
        Ok(Self {
            work_types: TrackerResource::new(
                work_type::hooks(work_types.clone()),
                work_type::list_hooks(work_types),
                timeout,
            ),
            projects: TrackerResource::new(
                project::hooks(projects.clone()),
                project::list_hooks(projects),
                timeout,
            ),
            project_categories: TrackerResource::new(
                project_category::hooks(categories.clone()),
                project_category::list_hooks(categories),
                timeout,
            ),
            fields: TrackerResource::new(
                field::hooks(fields.clone()),
                field::list_hooks(fields),
                timeout,
            ),
        })
    }

    /// Lists every object of `kind` as a JSON object keyed by id.
    #[instrument(skip(self, ctx, opts))]
    pub async fn list_json(
        &self,
        ctx: &OpContext,
        kind: ResourceType,
        opts: ListOptions,
    ) -> (Option<serde_json::Value>, Diagnostics) {
        match kind {
            ResourceType::WorkType => list_as_json(&self.work_types, ctx, opts).await,
            ResourceType::Project => list_as_json(&self.projects, ctx, opts).await,
            ResourceType::ProjectCategory => {
                list_as_json(&self.project_categories, ctx, opts).await
            }
            ResourceType::Field => list_as_json(&self.fields, ctx, opts).await,
        }
    }

    /// Imports one object of `kind` and renders the resulting state as JSON.
    #[instrument(skip(self, ctx))]
    pub async fn import_json(
        &self,
        ctx: &OpContext,
        kind: ResourceType,
        id: &str,
    ) -> (Option<serde_json::Value>, Diagnostics) {
        match kind {
            ResourceType::WorkType => import_as_json(&self.work_types, ctx, id).await,
            ResourceType::Project => import_as_json(&self.projects, ctx, id).await,
            ResourceType::ProjectCategory => {
                import_as_json(&self.project_categories, ctx, id).await
            }
            ResourceType::Field => import_as_json(&self.fields, ctx, id).await,
        }
    }
}

async fn list_as_json<K>(
    resource: &TrackerResource<K>,
    ctx: &OpContext,
    opts: ListOptions,
) -> (Option<serde_json::Value>, Diagnostics)
where
    K: ResourceKind,
    K::State: Serialize,
{
    let (items, mut diags) = resource.list(ctx, opts).await;
    let Some(items) = items else {
        return (None, diags);
    };
    let sorted: BTreeMap<String, K::State> = items.into_iter().collect();
    let json = render(&sorted, &mut diags);
    (json, diags)
}

async fn import_as_json<K>(
    resource: &TrackerResource<K>,
    ctx: &OpContext,
    id: &str,
) -> (Option<serde_json::Value>, Diagnostics)
where
    K: ResourceKind,
    K::State: Clone + Serialize,
{
    let mut access = TrackedState::<K::State>::new();
    let mut diags = resource.import(ctx, id, &mut access).await;
    if diags.has_error() {
        return (None, diags);
    }
    let json = access
        .into_tracked()
        .and_then(|state| render(&state, &mut diags));
    (json, diags)
}

fn render<T: Serialize>(value: &T, diags: &mut Diagnostics) -> Option<serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(err) => {
            diags.add_error("Unable to render output", err.to_string());
            None
        }
    }
}
