//! # Transport Errors
//!
//! Failures that happen *below* the HTTP status line: the request never got a
//! usable response, or the response could not be decoded. Non-2xx statuses are
//! not errors at this level; they travel in [`ResponseMeta`](crate::ResponseMeta)
//! and are judged by the classifier.

/// Error returned by a remote call adapter alongside (or instead of) response metadata.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("failed to decode response body: {0}")]
    Decode(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// True for the two caller-driven stop conditions (cancel and deadline).
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}
