//! # Destination Adapter Contract
//!
//! One adapter per external destination, all exposing the same contract
//! consumed by the orchestrator. Adapters differ by capability flags rather
//! than by type-specific branching in the core: the orchestrator queries
//! [`AdapterCapabilities`] to decide what payload a destination receives.
//!
//! Adapters own their HTTP/session/scraping internals entirely; the core
//! hands them a [`PostData`] payload and a [`CancellationToken`] and expects
//! a typed result back. A well-behaved `post()` checks the token before and
//! between every blocking sub-step.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::cancellation::CancellationToken;
use crate::models::{Submission, SubmissionFile, SubmissionPart};
use crate::orchestration::PostResult;
use crate::validation::ValidationResult;

/// What a destination accepts. Queried by the orchestrator and by
/// split/duplicate logic instead of hard-coding per-destination branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterCapabilities {
    pub accepts_additional_files: bool,
    pub accepts_source_urls: bool,
    pub accepts_scheduling: bool,
    /// Cap on additional files when `accepts_additional_files` is set.
    pub max_additional_files: Option<usize>,
}

/// Result of an adapter's login probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginStatus {
    pub logged_in: bool,
    pub username: Option<String>,
}

/// Successful delivery details returned by an adapter's `post()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    /// Destination-assigned identifier for the created post.
    pub posted_to: String,
    /// Raw destination response retained for display/debugging.
    pub destination_response: Option<Value>,
}

/// The merged per-destination payload handed to an adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostData {
    pub submission_uuid: Uuid,
    pub part_uuid: Uuid,
    pub destination_id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Merged option bag (default part merged into the real part).
    pub options: Value,
    pub files: Vec<SubmissionFile>,
    pub source_urls: Vec<String>,
}

impl PostData {
    /// Build the payload for one part, filtered by destination capabilities:
    /// additional files and source URLs are dropped for destinations that do
    /// not accept them.
    pub fn build(
        submission: &Submission,
        part: &SubmissionPart,
        merged_options: &Value,
        capabilities: AdapterCapabilities,
    ) -> Self {
        let mut files: Vec<SubmissionFile> =
            submission.primary_file().into_iter().cloned().collect();
        if capabilities.accepts_additional_files {
            let additional = submission.additional_files().cloned();
            match capabilities.max_additional_files {
                Some(max) => files.extend(additional.take(max)),
                None => files.extend(additional),
            }
        }

        let source_urls = if capabilities.accepts_source_urls {
            string_array(merged_options, "source_urls")
        } else {
            Vec::new()
        };

        Self {
            submission_uuid: submission.submission_uuid,
            part_uuid: part.part_uuid,
            destination_id: part.destination_id.clone(),
            title: merged_options
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(&submission.title)
                .to_string(),
            description: merged_options
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| submission.description.clone()),
            tags: string_array(merged_options, "tags"),
            options: merged_options.clone(),
            files,
            source_urls,
        }
    }
}

fn string_array(options: &Value, key: &str) -> Vec<String> {
    options
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Uniform contract every destination implements.
#[async_trait]
pub trait DestinationAdapter: Send + Sync {
    /// Stable identity used for registry lookup and part matching.
    fn destination_id(&self) -> &str;

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::default()
    }

    /// Probe the destination's session state for an account.
    async fn check_login_status(&self, account: &str) -> PostResult<LoginStatus>;

    /// Destination-specific rules over the merged part. Pure; runs inside
    /// the validation gate immediately before dispatch.
    fn validate(
        &self,
        _submission: &Submission,
        _merged_part: &SubmissionPart,
        _default_part: &SubmissionPart,
    ) -> ValidationResult {
        ValidationResult::default()
    }

    /// Deliver one part. Must observe `token` at every blocking boundary and
    /// return typed failures rather than letting errors escape.
    async fn post(&self, token: &CancellationToken, data: &PostData) -> PostResult<PostResponse>;
}
