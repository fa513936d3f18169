use crate::clients::TrackerClient;
use crate::model::{ProjectCategoryModel, ProjectCategoryPayload};
use crud_engine::{ApiOutcome, OpContext};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Adapter for `/projectCategory`.
#[derive(Debug, Clone)]
pub struct ProjectCategoryClient {
    inner: Arc<TrackerClient>,
}

impl ProjectCategoryClient {
    pub fn new(inner: Arc<TrackerClient>) -> Self {
        Self { inner }
    }

    #[instrument(skip_all)]
    pub async fn create(
        &self,
        ctx: &OpContext,
        payload: ProjectCategoryPayload,
    ) -> ApiOutcome<ProjectCategoryModel> {
        debug!("Sending request");
        let request = self
            .inner
            .request(Method::POST, &["projectCategory"])
            .json(&payload);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &OpContext, id: &str) -> ApiOutcome<ProjectCategoryModel> {
        debug!("Sending request");
        let request = self.inner.request(Method::GET, &["projectCategory", id]);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx, payload))]
    pub async fn update(
        &self,
        ctx: &OpContext,
        id: &str,
        payload: ProjectCategoryPayload,
    ) -> ApiOutcome<ProjectCategoryModel> {
        debug!("Sending request");
        let request = self
            .inner
            .request(Method::PUT, &["projectCategory", id])
            .json(&payload);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &OpContext, id: &str) -> ApiOutcome<()> {
        debug!("Sending request");
        let request = self.inner.request(Method::DELETE, &["projectCategory", id]);
        self.inner.send_status(ctx, request).await
    }

    #[instrument(skip_all)]
    pub async fn list(&self, ctx: &OpContext) -> ApiOutcome<Vec<ProjectCategoryModel>> {
        debug!("Sending request");
        let request = self.inner.request(Method::GET, &["projectCategory"]);
        self.inner.send_json(ctx, request).await
    }
}
