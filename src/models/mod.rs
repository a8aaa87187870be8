//! Data model for submissions and their per-destination parts.
//!
//! These types are owned by the repository (see [`crate::store`]); the
//! orchestrator only holds transient references while a submission is in
//! flight. The `is_posting` / `is_queued` flags deliberately do not exist
//! here: they are derived at read time from orchestrator state so a crash
//! or restart can never leave a stale flag behind.

pub mod submission;
pub mod submission_part;

pub use submission::{Schedule, Submission, SubmissionFile};
pub use submission_part::SubmissionPart;
