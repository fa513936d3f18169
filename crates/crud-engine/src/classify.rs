//! # Response-Outcome Classifier
//!
//! Decides whether a remote call succeeded and, when it did not, produces a
//! redacted two-part diagnostic (summary + detail).
//!
//! Success requires *both* of:
//! - no transport error, and
//! - a status in `200..=299`, in the per-call allow-list, or `404` when the
//!   caller opted into treating not-found as success.
//!
//! A transport error always wins over an otherwise successful status.

use crate::diagnostics::Diagnostics;
use crate::error::ApiError;
use crate::redact::redact;
use crate::response::{http_status, ResponseMeta};
use std::sync::Arc;

/// Default cap on the response body excerpt included in failure details.
pub const DEFAULT_BODY_LIMIT: usize = 1024;

/// Headers that may be echoed into a failure detail. Anything else is dropped.
const HEADER_ALLOW_LIST: &[&str] = &[
    "retry-after",
    "x-ratelimit-limit",
    "x-ratelimit-remaining",
    "x-ratelimit-reset",
    "x-ratelimit-nearlimit",
    "x-request-id",
    "x-arequestid",
    "atl-traceid",
];

/// Signature of a classifier; the runner takes one so tests can observe or replace it.
pub type Classifier = Arc<
    dyn Fn(&str, Option<&ResponseMeta>, Option<&ApiError>, &ClassifyOptions) -> Diagnostics
        + Send
        + Sync,
>;

/// The process-wide default classifier.
pub fn default_classifier() -> Classifier {
    Arc::new(classify_response)
}

/// Per-call policy for [`classify_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Extra statuses counted as success. `2xx` is always accepted on top of these.
    pub acceptable_statuses: Vec<u16>,
    pub treat_404_as_success: bool,
    pub include_headers: bool,
    pub include_body: bool,
    pub body_limit: usize,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            acceptable_statuses: Vec::new(),
            treat_404_as_success: false,
            include_headers: false,
            include_body: false,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ClassifyOptions {
    pub fn for_create() -> Self {
        Self::default().with_acceptable(vec![200, 201])
    }

    pub fn for_read() -> Self {
        Self::default()
    }

    pub fn for_update() -> Self {
        Self::default().with_acceptable(vec![200, 204])
    }

    pub fn for_delete(treat_404_as_success: bool) -> Self {
        Self::default()
            .with_acceptable(vec![200, 204])
            .treat_404_as_success(treat_404_as_success)
    }

    /// Replaces the allow-list.
    pub fn with_acceptable(mut self, statuses: Vec<u16>) -> Self {
        self.acceptable_statuses = statuses;
        self
    }

    pub fn treat_404_as_success(mut self, yes: bool) -> Self {
        self.treat_404_as_success = yes;
        self
    }

    pub fn with_headers(mut self) -> Self {
        self.include_headers = true;
        self
    }

    pub fn with_body(mut self, limit: Option<usize>) -> Self {
        self.include_body = true;
        if let Some(limit) = limit {
            self.body_limit = limit;
        }
        self
    }

    fn accepts(&self, status: u16) -> bool {
        (200..=299).contains(&status)
            || self.acceptable_statuses.contains(&status)
            || (status == 404 && self.treat_404_as_success)
    }
}

/// Pass/fail decision without building any text.
pub fn is_success(status: u16, err: Option<&ApiError>, opts: &ClassifyOptions) -> bool {
    err.is_none() && opts.accepts(status)
}

/// Classifies one remote call. An empty result means success.
pub fn classify_response(
    op: &str,
    meta: Option<&ResponseMeta>,
    err: Option<&ApiError>,
    opts: &ClassifyOptions,
) -> Diagnostics {
    let status = http_status(meta);
    let mut diags = Diagnostics::new();
    if is_success(status, err, opts) {
        return diags;
    }

    let summary = match err {
        Some(err) => format!("{op} failed: {err}"),
        None => format!("{op} failed"),
    };

    let mut detail = format!("HTTP status: {status}");
    if status == 0 {
        detail.push_str(" (the response status could not be determined)");
    }

    match err {
        Some(ApiError::Canceled) => detail.push_str(
            "\nThe operation was canceled by the caller before the remote call completed.",
        ),
        Some(ApiError::DeadlineExceeded) => detail.push_str(
            "\nThe operation deadline was exceeded before the remote call completed; \
             consider raising the operation timeout.",
        ),
        _ => {}
    }

    if let Some(meta) = meta {
        if opts.include_headers {
            append_headers(&mut detail, meta);
        }
        if opts.include_body && !meta.body.is_empty() {
            append_body(&mut detail, &meta.body, opts.body_limit);
        }
    }

    diags.add_error(redact(&summary), redact(&detail));
    diags
}

fn append_headers(detail: &mut String, meta: &ResponseMeta) {
    let selected: Vec<_> = HEADER_ALLOW_LIST
        .iter()
        .filter_map(|name| meta.header(name).map(|value| (*name, value)))
        .collect();
    if selected.is_empty() {
        return;
    }
    detail.push_str("\nResponse headers:");
    for (name, value) in selected {
        detail.push_str(&format!("\n  {name}: {value}"));
    }
}

fn append_body(detail: &mut String, body: &[u8], limit: usize) {
    let text = String::from_utf8_lossy(body);
    if text.len() <= limit {
        detail.push_str(&format!("\nResponse body:\n{text}"));
        return;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    detail.push_str(&format!(
        "\nResponse body (truncated to {limit} of {} bytes):\n{}",
        text.len(),
        &text[..cut]
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(status: u16) -> ResponseMeta {
        ResponseMeta::new(status)
    }

    #[test]
    fn test_2xx_is_always_accepted_even_with_overrides() {
        let opts = ClassifyOptions::default().with_acceptable(vec![201]);
        let diags = classify_response("create resource", Some(&meta(200)), None, &opts);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_overrides_do_not_rescue_server_errors() {
        let opts = ClassifyOptions::default().with_acceptable(vec![201]);
        let diags = classify_response("create resource", Some(&meta(500)), None, &opts);
        assert_eq!(diags.error_count(), 1);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "create resource failed");
        assert!(diag.detail.contains("HTTP status: 500"));
    }

    #[test]
    fn test_acceptable_status_outside_2xx() {
        let opts = ClassifyOptions::for_delete(false).with_acceptable(vec![303]);
        assert!(classify_response("delete resource", Some(&meta(303)), None, &opts).is_empty());
    }

    #[test]
    fn test_transport_error_overrides_success_status() {
        let err = ApiError::Timeout("read timed out".into());
        let diags =
            classify_response("read resource", Some(&meta(200)), Some(&err), &ClassifyOptions::for_read());
        assert!(diags.has_error());
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "read resource failed: request timed out: read timed out");
    }

    #[test]
    fn test_404_only_passes_when_opted_in() {
        let strict = ClassifyOptions::for_delete(false);
        let lenient = ClassifyOptions::for_delete(true);
        assert!(classify_response("delete resource", Some(&meta(404)), None, &strict).has_error());
        assert!(classify_response("delete resource", Some(&meta(404)), None, &lenient).is_empty());
    }

    #[test]
    fn test_unparseable_status_reported_as_zero() {
        let diags = classify_response("read resource", Some(&meta(999)), None, &ClassifyOptions::for_read());
        let diag = diags.iter().next().unwrap();
        assert!(diag.detail.starts_with("HTTP status: 0"));
        assert!(diag.detail.contains("could not be determined"));

        let diags = classify_response(
            "read resource",
            None,
            Some(&ApiError::Connect("refused".into())),
            &ClassifyOptions::for_read(),
        );
        assert!(diags.iter().next().unwrap().detail.starts_with("HTTP status: 0"));
    }

    #[test]
    fn test_cancel_and_deadline_hints_differ() {
        let opts = ClassifyOptions::for_read();
        let canceled = classify_response("read resource", None, Some(&ApiError::Canceled), &opts);
        let expired = classify_response("read resource", None, Some(&ApiError::DeadlineExceeded), &opts);
        let canceled = &canceled.iter().next().unwrap().detail;
        let expired = &expired.iter().next().unwrap().detail;
        assert!(canceled.contains("canceled by the caller"));
        assert!(expired.contains("deadline was exceeded"));
        assert_ne!(canceled, expired);
    }

    #[test]
    fn test_only_allow_listed_headers_are_echoed() {
        let response = meta(429)
            .with_header("Retry-After", "17")
            .with_header("X-ARequestId", "abc-123")
            .with_header("Set-Cookie", "JSESSIONID=deadbeef")
            .with_header("Server", "tracker");
        let opts = ClassifyOptions::for_read().with_headers();
        let diags = classify_response("read resource", Some(&response), None, &opts);
        let detail = &diags.iter().next().unwrap().detail;
        assert!(detail.contains("retry-after: 17"));
        assert!(detail.contains("x-arequestid: abc-123"));
        assert!(!detail.contains("JSESSIONID"));
        assert!(!detail.contains("server"));
    }

    #[test]
    fn test_body_is_truncated_and_redacted() {
        let mut body = String::from(r#"{"errorMessages":["bad"],"token":"s3cr3tvalue"}"#);
        body.push_str(&"x".repeat(4096));
        let response = meta(400).with_body(body.into_bytes());
        let opts = ClassifyOptions::for_create().with_body(Some(64));
        let diags = classify_response("create resource", Some(&response), None, &opts);
        let detail = &diags.iter().next().unwrap().detail;
        assert!(detail.contains("truncated to 64 of"));
        assert!(!detail.contains("s3cr3tvalue"));
        assert!(!detail.contains(&"x".repeat(100)));
    }

    #[test]
    fn test_body_omitted_unless_requested() {
        let response = meta(400).with_body(b"field 'name' is required".to_vec());
        let diags = classify_response("create resource", Some(&response), None, &ClassifyOptions::for_create());
        assert!(!diags.iter().next().unwrap().detail.contains("field 'name'"));
    }

    #[test]
    fn test_summary_is_redacted() {
        let err = ApiError::Transport("GET https://ops:pw@tracker.example.net failed".into());
        let diags = classify_response("read resource", None, Some(&err), &ClassifyOptions::for_read());
        let diag = diags.iter().next().unwrap();
        assert!(!diag.summary.contains("ops:pw"));
        assert!(diag.summary.contains("[REDACTED]"));
    }
}
