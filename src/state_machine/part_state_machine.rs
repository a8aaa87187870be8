use super::errors::{StateMachineError, StateMachineResult};
use super::events::PartEvent;
use super::states::PostStatus;
use crate::models::SubmissionPart;

/// Computes and applies part status transitions.
///
/// Stateless; operates on a [`SubmissionPart`] owned by the caller. The
/// orchestrator holds the only mutable reference while a submission is in
/// flight, so no locking happens here.
pub struct PartStateMachine;

impl PartStateMachine {
    /// Determine the target status for `(current, event)` without applying it.
    pub fn determine_target_status(
        current: PostStatus,
        event: &PartEvent,
    ) -> StateMachineResult<PostStatus> {
        let target = match (current, event) {
            (PostStatus::Unposted, PartEvent::Enqueue) => PostStatus::Queued,
            (PostStatus::Queued, PartEvent::Start) => PostStatus::Posting,
            (PostStatus::Posting, PartEvent::Succeed(_)) => PostStatus::Posted,
            (PostStatus::Posting, PartEvent::Fail(_)) => PostStatus::Failed,
            // A failed part is eligible again on the next run.
            (PostStatus::Failed, PartEvent::Requeue) => PostStatus::Queued,
            (from, event) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from.to_string(),
                    event: event.to_string(),
                })
            }
        };

        Ok(target)
    }

    /// Apply an event to a part, updating status and outcome fields.
    pub fn apply(part: &mut SubmissionPart, event: PartEvent) -> StateMachineResult<PostStatus> {
        let target = Self::determine_target_status(part.status, &event)?;

        match event {
            PartEvent::Succeed(posted_to) => part.mark_posted(posted_to),
            PartEvent::Fail(message) => part.mark_failed(message),
            _ => {
                part.status = target;
                part.updated_at = chrono::Utc::now();
            }
        }

        Ok(target)
    }
}
