//! # Post Orchestrator
//!
//! Owns the work queue of submissions awaiting post, enforces at most one
//! active post per submission, dispatches parts to destination adapters with
//! bounded concurrency, and applies the retry and partial-failure policy.
//!
//! ## Dispatch shape
//!
//! ```text
//! queue(uuid) ──▶ pending ──▶ claim (fresh token) ──▶ validate gate
//!                                  │                      │
//!                                  ▼                      ▼
//!                            active map          per-part: post → retry once
//!                                  │                      │
//!                                  ▼                      ▼
//!                            cancel(uuid)        record outcome, next part
//! ```
//!
//! Failure of one destination never aborts the others; a set cancellation
//! token abandons the submission's remaining parts entirely.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::{Notify, Semaphore};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::errors::{PostError, PostResult};
use super::types::{PostOutcome, SkippedPart, SubmissionPostResult};
use crate::adapters::{DestinationAdapter, PostData, PostResponse};
use crate::cancellation::CancellationToken;
use crate::config::SyndicateConfig;
use crate::events::{names, EventPublisher};
use crate::models::Submission;
use crate::registry::AdapterRegistry;
use crate::state_machine::{PartEvent, PartStateMachine, PostStatus, SubmissionRunState};
use crate::store::SubmissionStore;
use crate::validation::{SubmissionValidation, ValidationEngine};

/// Configuration for post dispatch.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum submission-level posts in flight at once.
    pub max_concurrent_submissions: usize,
    /// Immediate retries per part after a failed attempt.
    pub retry_limit: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_submissions: 3,
            retry_limit: 1,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_config(config: &SyndicateConfig) -> Self {
        Self {
            max_concurrent_submissions: config.max_concurrent_submissions.max(1),
            retry_limit: config.post_retry_limit,
        }
    }
}

/// Queue and in-flight bookkeeping. One lock: every "is this submission
/// busy?" predicate that gates the write APIs reads through it.
#[derive(Default)]
struct DispatchState {
    pending: VecDeque<Uuid>,
    active: HashMap<Uuid, CancellationToken>,
}

/// The component dispatching and tracking post attempts.
pub struct PostOrchestrator {
    store: Arc<dyn SubmissionStore>,
    registry: AdapterRegistry,
    event_publisher: EventPublisher,
    config: OrchestratorConfig,
    state: Mutex<DispatchState>,
    wake: Notify,
    limiter: Arc<Semaphore>,
}

impl PostOrchestrator {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        registry: AdapterRegistry,
        event_publisher: EventPublisher,
        config: OrchestratorConfig,
    ) -> Self {
        let limiter = Arc::new(Semaphore::new(config.max_concurrent_submissions));
        Self {
            store,
            registry,
            event_publisher,
            config,
            state: Mutex::new(DispatchState::default()),
            wake: Notify::new(),
            limiter,
        }
    }

    /// Add a submission to the pending queue.
    ///
    /// Idempotent: enqueueing a submission that is already pending or
    /// posting is a no-op. Returns whether the submission was enqueued.
    pub async fn queue(&self, submission_uuid: Uuid) -> bool {
        {
            let mut state = self.state.lock();
            if state.active.contains_key(&submission_uuid)
                || state.pending.contains(&submission_uuid)
            {
                debug!(submission_uuid = %submission_uuid, "Submission already queued or posting");
                return false;
            }
            state.pending.push_back(submission_uuid);
        }

        self.wake.notify_one();
        let _ = self
            .event_publisher
            .emit(
                names::SUBMISSION_QUEUED,
                json!({ "submission_uuid": submission_uuid }),
            )
            .await;
        true
    }

    pub fn is_currently_queued(&self, submission_uuid: Uuid) -> bool {
        self.state.lock().pending.contains(&submission_uuid)
    }

    pub fn is_currently_posting(&self, submission_uuid: Uuid) -> bool {
        self.state.lock().active.contains_key(&submission_uuid)
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn posting_count(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Gate for write APIs (update, delete, reschedule, file changes):
    /// rejects mutation of a submission that is queued or mid-post.
    pub fn assert_mutable(&self, submission_uuid: Uuid) -> PostResult<()> {
        let state = self.state.lock();
        if state.active.contains_key(&submission_uuid) {
            return Err(PostError::CorruptState(format!(
                "submission '{submission_uuid}' is currently posting"
            )));
        }
        if state.pending.contains(&submission_uuid) {
            return Err(PostError::CorruptState(format!(
                "submission '{submission_uuid}' is queued for posting"
            )));
        }
        Ok(())
    }

    /// Cancel a queued or in-flight submission.
    ///
    /// If posting, signals the active cancellation token; the in-flight
    /// adapter call is never force-killed and parts already posted stay
    /// posted. If merely queued, removes it from the pending set. Returns
    /// whether anything was cancelled.
    pub async fn cancel(&self, submission_uuid: Uuid) -> bool {
        enum Found {
            Posting,
            Queued,
            Absent,
        }

        let found = {
            let mut state = self.state.lock();
            if let Some(token) = state.active.get(&submission_uuid) {
                token.cancel();
                Found::Posting
            } else if let Some(position) =
                state.pending.iter().position(|uuid| *uuid == submission_uuid)
            {
                state.pending.remove(position);
                Found::Queued
            } else {
                Found::Absent
            }
        };

        match found {
            Found::Posting => {
                info!(submission_uuid = %submission_uuid, "Cancellation requested for in-flight post");
                true
            }
            Found::Queued => {
                info!(submission_uuid = %submission_uuid, "Removed queued submission");
                let _ = self
                    .event_publisher
                    .emit(
                        names::SUBMISSION_CANCELLED,
                        json!({ "submission_uuid": submission_uuid, "was_posting": false }),
                    )
                    .await;
                true
            }
            Found::Absent => false,
        }
    }

    /// Dispatch loop: claims pending submissions as concurrency slots free
    /// up and posts each on its own task. Runs until `shutdown` fires.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        info!(
            max_concurrent = self.config.max_concurrent_submissions,
            "Post orchestrator dispatch loop starting"
        );

        'dispatch: loop {
            let permit = tokio::select! {
                _ = shutdown.cancelled() => break 'dispatch,
                permit = self.limiter.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break 'dispatch,
                },
            };

            let claimed = loop {
                let claimed = {
                    let mut state = self.state.lock();
                    state.pending.pop_front().map(|submission_uuid| {
                        // Fresh token per dispatch; a previous run's
                        // cancellation must never leak into this one.
                        let token = CancellationToken::new();
                        state.active.insert(submission_uuid, token.clone());
                        (submission_uuid, token)
                    })
                };

                match claimed {
                    Some(pair) => break pair,
                    None => {
                        tokio::select! {
                            _ = shutdown.cancelled() => break 'dispatch,
                            _ = self.wake.notified() => {}
                        }
                    }
                }
            };

            let (submission_uuid, token) = claimed;
            let orchestrator = Arc::clone(&self);
            tokio::spawn(async move {
                let _permit = permit;
                orchestrator.dispatch_submission(submission_uuid, token).await;
            });
        }

        info!("Post orchestrator dispatch loop stopped");
    }

    /// Post one claimed submission and emit its aggregated terminal event.
    #[instrument(skip(self, token), fields(submission_uuid = %submission_uuid))]
    async fn dispatch_submission(&self, submission_uuid: Uuid, token: CancellationToken) {
        let _ = self
            .event_publisher
            .emit(
                names::SUBMISSION_POSTING,
                json!({ "submission_uuid": submission_uuid }),
            )
            .await;

        let outcome = self.post_submission(submission_uuid, &token).await;

        self.state.lock().active.remove(&submission_uuid);

        match outcome {
            Ok(Some(result)) => {
                info!(
                    run_state = %result.run_state,
                    posted = result.posted_count(),
                    failed = result.failed_count(),
                    skipped = result.skipped_count(),
                    "Submission post run finished"
                );
                let event_name = if result.run_state == SubmissionRunState::Cancelled {
                    names::SUBMISSION_CANCELLED
                } else {
                    names::SUBMISSION_COMPLETED
                };
                let payload = serde_json::to_value(&result).unwrap_or_else(|_| json!({}));
                let _ = self.event_publisher.emit(event_name, payload).await;
            }
            Ok(None) => {
                warn!("Submission disappeared before dispatch");
            }
            Err(err) => {
                error!(error = %err, "Submission post run failed");
                let _ = self
                    .event_publisher
                    .emit(
                        names::SUBMISSION_COMPLETED,
                        json!({
                            "submission_uuid": submission_uuid,
                            "error": err.to_string(),
                        }),
                    )
                    .await;
            }
        }
    }

    /// Validate, then walk eligible parts in order: skip blocked parts, post
    /// the rest, retrying each failed attempt exactly once. A set token
    /// abandons everything that has not started.
    async fn post_submission(
        &self,
        submission_uuid: Uuid,
        token: &CancellationToken,
    ) -> PostResult<Option<SubmissionPostResult>> {
        let started_at = Utc::now();

        let Some(mut submission) = self.store.find(submission_uuid).await? else {
            return Ok(None);
        };

        let validation = ValidationEngine::validate(&submission, &self.registry);
        let _ = self
            .event_publisher
            .emit(
                names::VALIDATION_COMPLETED,
                validation.to_event_payload(submission_uuid),
            )
            .await;

        let eligible = self.queue_eligible_parts(&mut submission, &validation)?;

        let mut outcomes: Vec<PostOutcome> = Vec::new();
        let mut skipped: Vec<SkippedPart> = Vec::new();
        let mut cancelled = false;

        for part_validation in &validation.parts {
            let already_posted = submission
                .part(part_validation.part_uuid)
                .is_some_and(|p| p.status == PostStatus::Posted);
            if part_validation.result.is_blocked() && !already_posted {
                debug!(
                    part_uuid = %part_validation.part_uuid,
                    destination_id = %part_validation.destination_id,
                    "Part blocked by validation; skipping"
                );
                skipped.push(SkippedPart {
                    part_uuid: part_validation.part_uuid,
                    destination_id: part_validation.destination_id.clone(),
                    problems: part_validation.result.problems.clone(),
                });
            }
        }

        for part_uuid in eligible {
            // Checked between parts: a cancelled submission never continues
            // to subsequent parts.
            if token.is_cancelled() {
                cancelled = true;
                break;
            }

            match self
                .post_part(&mut submission, part_uuid, &validation, token)
                .await
            {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => {}
                Err(err) if err.is_cancelled() => {
                    // The attempt aborted before mutating destination state;
                    // the part's stored status stays untouched.
                    cancelled = true;
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        let run_state = if cancelled {
            SubmissionRunState::Cancelled
        } else {
            SubmissionRunState::Completed
        };

        Ok(Some(SubmissionPostResult {
            submission_uuid,
            run_state,
            outcomes,
            skipped,
            started_at,
            completed_at: Utc::now(),
        }))
    }

    /// Move every eligible, unblocked part into `Queued` and return their
    /// ids in dispatch order. Eligible means `Unposted` (never attempted)
    /// or `Failed` (picked back up by this run); `Posted` parts are never
    /// touched again.
    fn queue_eligible_parts(
        &self,
        submission: &mut Submission,
        validation: &SubmissionValidation,
    ) -> PostResult<Vec<Uuid>> {
        let mut eligible = Vec::new();

        for part in submission.postable_parts_mut() {
            let blocked = validation
                .part(part.part_uuid)
                .is_some_and(|p| p.result.is_blocked());
            if blocked {
                continue;
            }

            let event = match part.status {
                PostStatus::Unposted => PartEvent::Enqueue,
                PostStatus::Failed => PartEvent::Requeue,
                _ => continue,
            };

            PartStateMachine::apply(part, event)
                .map_err(|e| PostError::CorruptState(e.to_string()))?;
            eligible.push(part.part_uuid);
        }

        Ok(eligible)
    }

    /// Post a single part. Returns `Ok(Some(outcome))` once the part is
    /// terminal for this run, `Ok(None)` if the part vanished, and
    /// `Err(Cancelled)` when the attempt aborted without mutating state.
    async fn post_part(
        &self,
        submission: &mut Submission,
        part_uuid: Uuid,
        validation: &SubmissionValidation,
        token: &CancellationToken,
    ) -> PostResult<Option<PostOutcome>> {
        let Some(part_validation) = validation.part(part_uuid) else {
            return Ok(None);
        };

        let adapter = self.registry.get_required(&part_validation.destination_id).map_err(|_| {
            PostError::AdapterMissing(part_validation.destination_id.clone())
        })?;
        let capabilities = adapter.capabilities();

        let submission_snapshot = submission.clone();
        let Some(part) = submission
            .parts
            .iter_mut()
            .find(|p| p.part_uuid == part_uuid)
        else {
            return Ok(None);
        };

        let data = PostData::build(
            &submission_snapshot,
            part,
            &part_validation.merged_options,
            capabilities,
        );

        PartStateMachine::apply(part, PartEvent::Start)
            .map_err(|e| PostError::CorruptState(e.to_string()))?;
        debug!(
            part_uuid = %part_uuid,
            destination_id = %part.destination_id,
            "Posting part"
        );

        match self.post_with_retry(adapter.as_ref(), token, &data).await {
            Ok(response) => {
                if token.is_cancelled() {
                    // Cancelled mid-round-trip: the result is discarded and
                    // the part is left failed for this run.
                    let message = "post cancelled before completion was confirmed".to_string();
                    PartStateMachine::apply(part, PartEvent::Fail(message.clone()))
                        .map_err(|e| PostError::CorruptState(e.to_string()))?;
                    self.record_and_announce(part_uuid, &data.destination_id, None, Some(message.clone()))
                        .await?;
                    let mut outcome =
                        PostOutcome::failed(part_uuid, data.destination_id.clone(), message);
                    outcome.destination_response = response.destination_response;
                    return Ok(Some(outcome));
                }

                PartStateMachine::apply(part, PartEvent::Succeed(response.posted_to.clone()))
                    .map_err(|e| PostError::CorruptState(e.to_string()))?;
                self.record_and_announce(
                    part_uuid,
                    &data.destination_id,
                    Some(response.posted_to.clone()),
                    None,
                )
                .await?;
                Ok(Some(PostOutcome::posted(
                    part_uuid,
                    data.destination_id.clone(),
                    response.posted_to,
                    response.destination_response,
                )))
            }
            Err(err) if err.is_cancelled() => Err(PostError::Cancelled),
            Err(err) => {
                let message = err.to_string();
                PartStateMachine::apply(part, PartEvent::Fail(message.clone()))
                    .map_err(|e| PostError::CorruptState(e.to_string()))?;
                self.record_and_announce(part_uuid, &data.destination_id, None, Some(message.clone()))
                    .await?;
                Ok(Some(PostOutcome::failed(
                    part_uuid,
                    data.destination_id.clone(),
                    message,
                )))
            }
        }
    }

    /// Invoke the adapter, retrying a failed attempt exactly once,
    /// immediately, with identical data. Cancellation is never retried.
    async fn post_with_retry(
        &self,
        adapter: &dyn DestinationAdapter,
        token: &CancellationToken,
        data: &PostData,
    ) -> PostResult<PostResponse> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match adapter.post(token, data).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    if token.is_cancelled() {
                        return Err(PostError::Cancelled);
                    }
                    if attempt > self.config.retry_limit {
                        return Err(err);
                    }
                    warn!(
                        destination_id = %data.destination_id,
                        attempt = attempt,
                        error = %err,
                        "Post attempt failed; retrying immediately"
                    );
                }
            }
        }
    }

    /// Persist a part's terminal status and emit its per-part event.
    async fn record_and_announce(
        &self,
        part_uuid: Uuid,
        destination_id: &str,
        posted_to: Option<String>,
        error: Option<String>,
    ) -> PostResult<()> {
        let status = if posted_to.is_some() {
            PostStatus::Posted
        } else {
            PostStatus::Failed
        };
        self.store
            .record_part_outcome(part_uuid, status, posted_to.clone(), error.clone())
            .await?;

        let (event_name, payload) = if let Some(posted_to) = posted_to {
            (
                names::PART_POSTED,
                json!({
                    "part_uuid": part_uuid,
                    "destination_id": destination_id,
                    "posted_to": posted_to,
                }),
            )
        } else {
            (
                names::PART_FAILED,
                json!({
                    "part_uuid": part_uuid,
                    "destination_id": destination_id,
                    "error": error,
                }),
            )
        };
        let _ = self.event_publisher.emit(event_name, payload).await;
        Ok(())
    }
}
