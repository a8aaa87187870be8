use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::state_machine::{PostStatus, SubmissionRunState};

/// Terminal record for one attempted part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostOutcome {
    pub part_uuid: Uuid,
    pub destination_id: String,
    pub status: PostStatus,
    /// Destination-assigned identifier; present if and only if `status` is
    /// [`PostStatus::Posted`].
    pub posted_to: Option<String>,
    pub error: Option<String>,
    pub destination_response: Option<Value>,
}

impl PostOutcome {
    pub fn posted(
        part_uuid: Uuid,
        destination_id: impl Into<String>,
        posted_to: impl Into<String>,
        destination_response: Option<Value>,
    ) -> Self {
        Self {
            part_uuid,
            destination_id: destination_id.into(),
            status: PostStatus::Posted,
            posted_to: Some(posted_to.into()),
            error: None,
            destination_response,
        }
    }

    pub fn failed(
        part_uuid: Uuid,
        destination_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            part_uuid,
            destination_id: destination_id.into(),
            status: PostStatus::Failed,
            posted_to: None,
            error: Some(error.into()),
            destination_response: None,
        }
    }
}

/// A part held back by the validation gate; never attempted, status untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedPart {
    pub part_uuid: Uuid,
    pub destination_id: String,
    pub problems: Vec<String>,
}

/// Aggregated result of one orchestrator run over a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPostResult {
    pub submission_uuid: Uuid,
    pub run_state: SubmissionRunState,
    pub outcomes: Vec<PostOutcome>,
    pub skipped: Vec<SkippedPart>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SubmissionPostResult {
    pub fn posted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == PostStatus::Posted)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == PostStatus::Failed)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
