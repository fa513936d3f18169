use crate::clients::TrackerClient;
use crate::model::{ProjectModel, ProjectPayload, SearchPage};
use crud_engine::{ApiOutcome, OpContext};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Adapter for `/project`.
#[derive(Debug, Clone)]
pub struct ProjectClient {
    inner: Arc<TrackerClient>,
}

impl ProjectClient {
    pub fn new(inner: Arc<TrackerClient>) -> Self {
        Self { inner }
    }

    /// The response carries only `id` and `key`.
    #[instrument(skip_all)]
    pub async fn create(&self, ctx: &OpContext, payload: ProjectPayload) -> ApiOutcome<ProjectModel> {
        debug!("Sending request");
        let request = self.inner.request(Method::POST, &["project"]).json(&payload);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &OpContext, id: &str) -> ApiOutcome<ProjectModel> {
        debug!("Sending request");
        let request = self
            .inner
            .request(Method::GET, &["project", id])
            .query(&[("expand", "description,lead,url,projectKeys")]);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx, payload))]
    pub async fn update(
        &self,
        ctx: &OpContext,
        id: &str,
        payload: ProjectPayload,
    ) -> ApiOutcome<ProjectModel> {
        debug!("Sending request");
        let request = self.inner.request(Method::PUT, &["project", id]).json(&payload);
        self.inner.send_json(ctx, request).await
    }

    /// With `enable_undo` the project goes to the trash instead of being purged.
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &OpContext, id: &str, enable_undo: bool) -> ApiOutcome<()> {
        debug!("Sending request");
        let request = self
            .inner
            .request(Method::DELETE, &["project", id])
            .query(&[("enableUndo", enable_undo)]);
        self.inner.send_status(ctx, request).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn search(
        &self,
        ctx: &OpContext,
        start_at: usize,
        max_results: usize,
    ) -> ApiOutcome<SearchPage<ProjectModel>> {
        debug!("Sending request");
        let request = self
            .inner
            .request(Method::GET, &["project", "search"])
            .query(&[("startAt", start_at), ("maxResults", max_results)])
            .query(&[("expand", "description,lead,url")]);
        self.inner.send_json(ctx, request).await
    }
}
