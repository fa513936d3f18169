use crate::clients::TrackerClient;
use crate::model::{FieldModel, FieldPayload, SearchPage};
use crud_engine::{ApiOutcome, OpContext, ResponseMeta};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Adapter for `/field`.
///
/// Custom fields have no read-by-id endpoint, so reads go through the search
/// endpoint filtered by id. A freshly created field can take a moment to show
/// up there, hence the polling in [`FieldClient::find`].
#[derive(Debug, Clone)]
pub struct FieldClient {
    inner: Arc<TrackerClient>,
}

impl FieldClient {
    pub fn new(inner: Arc<TrackerClient>) -> Self {
        Self { inner }
    }

    #[instrument(skip_all)]
    pub async fn create(&self, ctx: &OpContext, payload: FieldPayload) -> ApiOutcome<FieldModel> {
        debug!("Sending request");
        let request = self.inner.request(Method::POST, &["field"]).json(&payload);
        self.inner.send_json(ctx, request).await
    }

    /// Looks a custom field up by id, polling until it is visible.
    ///
    /// Stops at the first transport failure or non-2xx response. When no
    /// attempt finds the field, reports a synthesized 404 so the caller treats
    /// it like any other missing object.
    #[instrument(skip(self, ctx))]
    pub async fn find(&self, ctx: &OpContext, id: &str) -> ApiOutcome<FieldModel> {
        let attempts = self.inner.lookup_attempts().max(1);
        for attempt in 1..=attempts {
            debug!(attempt, "Sending request");
            let request = self
                .inner
                .request(Method::GET, &["field", "search"])
                .query(&[("id", id), ("type", "custom")]);
            let outcome: ApiOutcome<SearchPage<FieldModel>> =
                self.inner.send_json(ctx, request).await;

            let ApiOutcome { model, meta, error } = outcome;
            let Some(page) = model else {
                return ApiOutcome {
                    model: None,
                    meta,
                    error,
                };
            };
            if let Some(found) = page.values.into_iter().find(|f| f.id == id) {
                return ApiOutcome {
                    model: Some(found),
                    meta,
                    error,
                };
            }

            if attempt < attempts {
                if let Err(err) = ctx.sleep(self.inner.lookup_interval()).await {
                    return ApiOutcome::failed(err);
                }
            }
        }
        debug!("field not visible after polling");
        ApiOutcome::status_only(ResponseMeta::new(404))
    }

    /// Answers 204 with no body.
    #[instrument(skip(self, ctx, payload))]
    pub async fn update(&self, ctx: &OpContext, id: &str, payload: FieldPayload) -> ApiOutcome<()> {
        debug!("Sending request");
        let body = FieldPayload {
            field_type: None,
            ..payload
        };
        let request = self.inner.request(Method::PUT, &["field", id]).json(&body);
        self.inner.send_status(ctx, request).await
    }

    /// Permanent deletion. The service answers 303 and finishes asynchronously.
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &OpContext, id: &str) -> ApiOutcome<()> {
        debug!("Sending request");
        let request = self.inner.request(Method::DELETE, &["field", id]);
        self.inner.send_status(ctx, request).await
    }

    /// Moves the field to the trash, where it can be restored.
    #[instrument(skip(self, ctx))]
    pub async fn trash(&self, ctx: &OpContext, id: &str) -> ApiOutcome<()> {
        debug!("Sending request");
        let request = self.inner.request(Method::POST, &["field", id, "trash"]);
        self.inner.send_status(ctx, request).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn search(
        &self,
        ctx: &OpContext,
        start_at: usize,
        max_results: usize,
    ) -> ApiOutcome<SearchPage<FieldModel>> {
        debug!("Sending request");
        let request = self
            .inner
            .request(Method::GET, &["field", "search"])
            .query(&[("type", "custom")])
            .query(&[("startAt", start_at), ("maxResults", max_results)]);
        self.inner.send_json(ctx, request).await
    }
}
