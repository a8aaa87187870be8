//! Event system for pushing lifecycle updates to subscribers.
//!
//! The orchestrator guarantees emission order per publisher; delivery and
//! ordering to individual subscribers follow `tokio::sync::broadcast`
//! semantics (slow subscribers may observe lag).

pub mod publisher;

pub use publisher::{EventPublisher, PublishError, PublishedEvent};

/// Well-known event names emitted by the core.
pub mod names {
    pub const SUBMISSION_QUEUED: &str = "submission.queued";
    pub const SUBMISSION_POSTING: &str = "submission.posting";
    pub const SUBMISSION_COMPLETED: &str = "submission.completed";
    pub const SUBMISSION_CANCELLED: &str = "submission.cancelled";
    pub const PART_POSTED: &str = "part.posted";
    pub const PART_FAILED: &str = "part.failed";
    pub const VALIDATION_COMPLETED: &str = "validation.completed";
    pub const ADAPTER_REGISTERED: &str = "adapter.registered";
}
