use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::submission_part::SubmissionPart;
use crate::state_machine::PostStatus;

/// When (and whether) a submission should be promoted for posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Earliest time the submission becomes eligible to post.
    pub post_at: Option<DateTime<Utc>>,
    /// One-shot flag; cleared when the scheduler promotes the submission.
    pub is_scheduled: bool,
}

impl Schedule {
    pub fn at(post_at: DateTime<Utc>) -> Self {
        Self {
            post_at: Some(post_at),
            is_scheduled: true,
        }
    }

    /// True when the schedule has fired or should fire now.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_scheduled && self.post_at.is_some_and(|at| at <= now)
    }
}

/// Reference to a content file attached to a submission.
///
/// The core never touches file contents; scaling and format conversion are
/// destination-adapter concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFile {
    pub file_path: String,
    /// The primary file is always delivered; additional files are delivered
    /// only to destinations whose capabilities accept them.
    pub is_primary: bool,
}

impl SubmissionFile {
    pub fn primary(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            is_primary: true,
        }
    }

    pub fn additional(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            is_primary: false,
        }
    }
}

/// A unit of content plus its per-destination delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub submission_uuid: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub files: Vec<SubmissionFile>,
    /// Ordered collection; dispatch preserves this order.
    pub parts: Vec<SubmissionPart>,
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        let submission_uuid = Uuid::new_v4();
        Self {
            submission_uuid,
            title: title.into(),
            description: None,
            files: Vec::new(),
            parts: vec![SubmissionPart::default_part(submission_uuid)],
            schedule: Schedule::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The synthetic part holding shared defaults. Never posted.
    pub fn default_part(&self) -> Option<&SubmissionPart> {
        self.parts.iter().find(|p| p.is_default)
    }

    /// Real destination parts, in dispatch order.
    pub fn postable_parts(&self) -> impl Iterator<Item = &SubmissionPart> {
        self.parts.iter().filter(|p| !p.is_default)
    }

    pub fn postable_parts_mut(&mut self) -> impl Iterator<Item = &mut SubmissionPart> {
        self.parts.iter_mut().filter(|p| !p.is_default)
    }

    pub fn part(&self, part_uuid: Uuid) -> Option<&SubmissionPart> {
        self.parts.iter().find(|p| p.part_uuid == part_uuid)
    }

    /// True once every real part sits in a terminal status for its last run.
    pub fn all_parts_terminal(&self) -> bool {
        self.postable_parts()
            .all(|p| matches!(p.status, PostStatus::Posted | PostStatus::Failed))
    }

    pub fn primary_file(&self) -> Option<&SubmissionFile> {
        self.files.iter().find(|f| f.is_primary)
    }

    pub fn additional_files(&self) -> impl Iterator<Item = &SubmissionFile> {
        self.files.iter().filter(|f| !f.is_primary)
    }
}
