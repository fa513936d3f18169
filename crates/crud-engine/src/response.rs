//! # Remote Call Results
//!
//! The uniform `(model, responseMetadata, error)` triple every remote call
//! adapter returns, and the status extraction used by the classifier and by
//! the Read not-found short-circuit.

use crate::error::ApiError;
use std::collections::BTreeMap;

/// Status line, headers and raw body of one HTTP exchange.
///
/// `status` is the raw value reported by the transport. It is validated by
/// [`http_status`]; anything outside `100..=599` is treated as unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    /// Header names are stored lower-cased.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl ResponseMeta {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Resolves the status code of a response, or `0` when it is absent or implausible.
pub fn http_status(meta: Option<&ResponseMeta>) -> u16 {
    match meta {
        Some(meta) if (100..=599).contains(&meta.status) => meta.status,
        _ => 0,
    }
}

/// Result of one remote call.
#[derive(Debug, Clone)]
pub struct ApiOutcome<M> {
    pub model: Option<M>,
    pub meta: Option<ResponseMeta>,
    pub error: Option<ApiError>,
}

impl<M> ApiOutcome<M> {
    /// A response with a decoded body.
    pub fn ok(model: M, meta: ResponseMeta) -> Self {
        Self {
            model: Some(model),
            meta: Some(meta),
            error: None,
        }
    }

    /// A response whose body carries no model (error statuses, 204s).
    pub fn status_only(meta: ResponseMeta) -> Self {
        Self {
            model: None,
            meta: Some(meta),
            error: None,
        }
    }

    /// A transport failure with no usable response.
    pub fn failed(error: ApiError) -> Self {
        Self {
            model: None,
            meta: None,
            error: Some(error),
        }
    }

    pub fn with_error(mut self, error: ApiError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn status(&self) -> u16 {
        http_status(self.meta.as_ref())
    }

    pub fn map<N>(self, f: impl FnOnce(M) -> N) -> ApiOutcome<N> {
        ApiOutcome {
            model: self.model.map(f),
            meta: self.meta,
            error: self.error,
        }
    }
}
