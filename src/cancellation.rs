//! Cooperative cancellation for in-flight posts.
//!
//! The orchestrator creates one fresh token per dispatch and is the only
//! writer; every adapter call along the chain polls it. Cancellation never
//! force-kills an in-flight network call: the adapter observes the token at
//! its next blocking boundary and aborts, and the orchestrator discards
//! whatever the current round-trip eventually resolves to. A cancelled token
//! is never reused: requeuing a cancelled submission allocates a new one.

use crate::orchestration::PostError;

/// Shared cancellation flag threaded through every posting call.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: tokio_util::sync::CancellationToken,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cooperative abort. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolves once the token is cancelled; for use in `tokio::select!`.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await;
    }

    /// The check adapters make before and between blocking sub-steps.
    ///
    /// ```
    /// use syndicate_core::cancellation::CancellationToken;
    ///
    /// let token = CancellationToken::new();
    /// assert!(token.checkpoint().is_ok());
    /// token.cancel();
    /// assert!(token.checkpoint().is_err());
    /// ```
    pub fn checkpoint(&self) -> Result<(), PostError> {
        if self.inner.is_cancelled() {
            Err(PostError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_observed_by_clones() {
        let token = CancellationToken::new();
        let reader = token.clone();
        assert!(!reader.is_cancelled());

        token.cancel();
        assert!(reader.is_cancelled());
        assert!(matches!(reader.checkpoint(), Err(PostError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let token = CancellationToken::new();
        let waiter = token.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            true
        });

        token.cancel();
        assert!(handle.await.unwrap());
    }

    #[test]
    fn test_fresh_tokens_are_independent() {
        let first = CancellationToken::new();
        first.cancel();

        // A requeue allocates a fresh token; the old cancellation must not
        // leak into the new attempt.
        let second = CancellationToken::new();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }
}
