//! In-memory store implementation for testing and embedding.
//!
//! Not durable: all state is lost when the process exits.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{StoreError, StoreResult, SubmissionStore};
use crate::models::{Schedule, Submission};
use crate::state_machine::PostStatus;

/// Thread-safe in-memory [`SubmissionStore`].
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    submissions: DashMap<Uuid, Submission>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn find_all(&self) -> StoreResult<Vec<Submission>> {
        Ok(self
            .submissions
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find(&self, submission_uuid: Uuid) -> StoreResult<Option<Submission>> {
        Ok(self
            .submissions
            .get(&submission_uuid)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, submission: Submission) -> StoreResult<()> {
        self.submissions
            .insert(submission.submission_uuid, submission);
        Ok(())
    }

    async fn update(&self, mut submission: Submission) -> StoreResult<()> {
        let mut entry = self
            .submissions
            .get_mut(&submission.submission_uuid)
            .ok_or(StoreError::SubmissionNotFound(submission.submission_uuid))?;
        submission.updated_at = Utc::now();
        *entry.value_mut() = submission;
        Ok(())
    }

    async fn remove(&self, submission_uuid: Uuid) -> StoreResult<()> {
        self.submissions
            .remove(&submission_uuid)
            .map(|_| ())
            .ok_or(StoreError::SubmissionNotFound(submission_uuid))
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.submissions.len())
    }

    async fn record_part_outcome(
        &self,
        part_uuid: Uuid,
        status: PostStatus,
        posted_to: Option<String>,
        error: Option<String>,
    ) -> StoreResult<()> {
        if posted_to.is_some() != (status == PostStatus::Posted) {
            return Err(StoreError::Backend(format!(
                "posted_to must be set exactly when status is posted (got {status})"
            )));
        }

        for mut entry in self.submissions.iter_mut() {
            if let Some(part) = entry
                .value_mut()
                .parts
                .iter_mut()
                .find(|p| p.part_uuid == part_uuid)
            {
                part.status = status;
                part.posted_to = posted_to;
                part.last_error = error;
                part.updated_at = Utc::now();
                return Ok(());
            }
        }

        Err(StoreError::PartNotFound(part_uuid))
    }

    async fn set_schedule(&self, submission_uuid: Uuid, schedule: Schedule) -> StoreResult<()> {
        let mut entry = self
            .submissions
            .get_mut(&submission_uuid)
            .ok_or(StoreError::SubmissionNotFound(submission_uuid))?;
        entry.value_mut().schedule = schedule;
        entry.value_mut().updated_at = Utc::now();
        Ok(())
    }
}
