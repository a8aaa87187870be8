//! Pluggable persistence for submissions.
//!
//! The orchestrator and scheduler never own storage: they read current state
//! through [`SubmissionStore`] and write back terminal per-part statuses and
//! schedule changes. Transient posting state (`is_posting`, `is_queued`)
//! never touches the store; it is derived from orchestrator state at read
//! time.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Schedule, Submission};
use crate::state_machine::PostStatus;

pub use memory::InMemorySubmissionStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("submission '{0}' not found")]
    SubmissionNotFound(Uuid),

    #[error("part '{0}' not found")]
    PartNotFound(Uuid),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository contract over submissions and their parts.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Submission>>;

    async fn find(&self, submission_uuid: Uuid) -> StoreResult<Option<Submission>>;

    /// Insert or replace a whole submission.
    async fn save(&self, submission: Submission) -> StoreResult<()>;

    /// Replace an existing submission; errors if it was never saved.
    async fn update(&self, submission: Submission) -> StoreResult<()>;

    async fn remove(&self, submission_uuid: Uuid) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<usize>;

    /// Write one part's terminal status for a run.
    ///
    /// `posted_to` must be `Some` exactly when `status` is
    /// [`PostStatus::Posted`]; implementations reject anything else as a
    /// backend error.
    async fn record_part_outcome(
        &self,
        part_uuid: Uuid,
        status: PostStatus,
        posted_to: Option<String>,
        error: Option<String>,
    ) -> StoreResult<()>;

    /// Replace a submission's schedule (used by the scheduler's one-shot
    /// promotion and by reschedule APIs).
    async fn set_schedule(&self, submission_uuid: Uuid, schedule: Schedule) -> StoreResult<()>;
}
