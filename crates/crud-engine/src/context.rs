//! # Operation Context
//!
//! The cancellable, optionally deadline-bound execution context handed to every
//! lifecycle operation and every remote call adapter.

use crate::error::ApiError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline.
///
/// Cloning is cheap; clones observe the same cancellation. A child created with
/// [`OpContext::with_timeout`] is canceled when its parent is, and additionally
/// expires at its own deadline (never later than the parent's).
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derives a child context whose deadline is `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The reason this context is done, if it is.
    pub fn err(&self) -> Option<ApiError> {
        if self.token.is_cancelled() {
            return Some(ApiError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ApiError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drives `fut` to completion unless the context is canceled or its deadline passes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ApiError> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        let deadline = self.deadline;
        let expiry = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ApiError::Canceled),
            _ = expiry => Err(ApiError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }

    /// Cancellation-aware sleep used between polling attempts.
    pub async fn sleep(&self, duration: Duration) -> Result<(), ApiError> {
        self.run(tokio::time::sleep(duration)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let ctx = OpContext::new();
        let out = ctx.run(async { 7 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_cancelled_context_short_circuits() {
        let ctx = OpContext::new();
        ctx.cancel();
        let out = ctx.run(async { 7 }).await;
        assert_eq!(out, Err(ApiError::Canceled));
        assert_eq!(ctx.err(), Some(ApiError::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_future() {
        let ctx = OpContext::new().with_timeout(Duration::from_millis(50));
        let out = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert_eq!(out, Err(ApiError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_child_observes_parent_cancellation() {
        let parent = OpContext::new();
        let child = parent.with_timeout(Duration::from_secs(60));
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_never_outlives_parent_deadline() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let parent = OpContext::new().with_timeout(Duration::from_millis(10));
            let child = parent.with_timeout(Duration::from_secs(60));
            assert_eq!(child.deadline(), parent.deadline());
        });
    }
}
