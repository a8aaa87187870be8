use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::state_machine::PostStatus;

/// One destination's configuration and post status within a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPart {
    pub part_uuid: Uuid,
    pub submission_uuid: Uuid,
    /// Destination identity used to resolve the adapter. Empty for the
    /// default part.
    pub destination_id: String,
    /// Destination-specific option bag (title/description/tags overrides,
    /// ratings, folders, whatever the adapter understands).
    pub options: Value,
    pub status: PostStatus,
    /// Destination-assigned identifier; set if and only if `status` is
    /// [`PostStatus::Posted`].
    pub posted_to: Option<String>,
    /// Message from the last terminal failure, retained for display.
    pub last_error: Option<String>,
    /// Marks the synthetic part holding shared defaults.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubmissionPart {
    pub fn new(submission_uuid: Uuid, destination_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            part_uuid: Uuid::new_v4(),
            submission_uuid,
            destination_id: destination_id.into(),
            options: Value::Object(serde_json::Map::new()),
            status: PostStatus::default(),
            posted_to: None,
            last_error: None,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create the synthetic default part for a submission.
    pub fn default_part(submission_uuid: Uuid) -> Self {
        let mut part = Self::new(submission_uuid, "");
        part.is_default = true;
        part
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// Record a successful delivery.
    pub fn mark_posted(&mut self, posted_to: impl Into<String>) {
        self.status = PostStatus::Posted;
        self.posted_to = Some(posted_to.into());
        self.last_error = None;
        self.updated_at = Utc::now();
    }

    /// Record a terminal failure for this run.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = PostStatus::Failed;
        self.posted_to = None;
        self.last_error = Some(error.into());
        self.updated_at = Utc::now();
    }
}
