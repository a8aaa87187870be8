use thiserror::Error;

/// Failure taxonomy for post dispatch.
///
/// The orchestrator's retry policy hangs off this classification:
/// `PostFailed` earns exactly one immediate retry, `Cancelled` abandons the
/// submission's remaining parts with no retry, and `CorruptState` is
/// surfaced to the caller immediately without ever entering the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    /// One or more validation problems; the part is skipped, not attempted.
    #[error("validation blocked: {}", problems.join("; "))]
    ValidationBlocked { problems: Vec<String> },

    /// The cancellation token was observed set.
    #[error("post cancelled")]
    Cancelled,

    /// Destination-side rejection or transport error.
    #[error("post to '{destination}' failed: {message}")]
    PostFailed {
        destination: String,
        message: String,
    },

    /// Invariant violation caught at write time, e.g. mutating a submission
    /// mid-post. Rejected immediately, never queued or retried.
    #[error("corrupt state: {0}")]
    CorruptState(String),

    #[error("no adapter registered for destination '{0}'")]
    AdapterMissing(String),

    #[error("store error: {0}")]
    Store(String),
}

impl PostError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the single-immediate-retry policy applies.
    ///
    /// Only ordinary destination failures are retried; the policy makes no
    /// transient/permanent distinction beyond that (observed destination
    /// behavior: identical second attempts often succeed).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PostFailed { .. })
    }
}

impl From<crate::store::StoreError> for PostError {
    fn from(err: crate::store::StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

pub type PostResult<T> = Result<T, PostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_eligibility() {
        let failed = PostError::PostFailed {
            destination: "artfort".into(),
            message: "502".into(),
        };
        assert!(failed.is_retryable());

        assert!(!PostError::Cancelled.is_retryable());
        assert!(PostError::Cancelled.is_cancelled());
        assert!(!PostError::CorruptState("mid-post edit".into()).is_retryable());
        assert!(!PostError::AdapterMissing("nowhere".into()).is_retryable());
    }
}
