use crate::clients::TrackerClient;
use crate::model::{WorkTypeModel, WorkTypePayload};
use crud_engine::{ApiOutcome, OpContext};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Adapter for `/issuetype`.
#[derive(Debug, Clone)]
pub struct WorkTypeClient {
    inner: Arc<TrackerClient>,
}

impl WorkTypeClient {
    pub fn new(inner: Arc<TrackerClient>) -> Self {
        Self { inner }
    }

    #[instrument(skip_all)]
    pub async fn create(&self, ctx: &OpContext, payload: WorkTypePayload) -> ApiOutcome<WorkTypeModel> {
        debug!("Sending request");
        let request = self.inner.request(Method::POST, &["issuetype"]).json(&payload);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &OpContext, id: &str) -> ApiOutcome<WorkTypeModel> {
        debug!("Sending request");
        let request = self.inner.request(Method::GET, &["issuetype", id]);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx, payload))]
    pub async fn update(
        &self,
        ctx: &OpContext,
        id: &str,
        payload: WorkTypePayload,
    ) -> ApiOutcome<WorkTypeModel> {
        debug!("Sending request");
        let body = WorkTypePayload {
            hierarchy_level: None,
            ..payload
        };
        let request = self.inner.request(Method::PUT, &["issuetype", id]).json(&body);
        self.inner.send_json(ctx, request).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &OpContext, id: &str) -> ApiOutcome<()> {
        debug!("Sending request");
        let request = self.inner.request(Method::DELETE, &["issuetype", id]);
        self.inner.send_status(ctx, request).await
    }

    /// Every work type visible to the caller, global and project-scoped.
    #[instrument(skip_all)]
    pub async fn list(&self, ctx: &OpContext) -> ApiOutcome<Vec<WorkTypeModel>> {
        debug!("Sending request");
        let request = self.inner.request(Method::GET, &["issuetype"]);
        self.inner.send_json(ctx, request).await
    }
}
