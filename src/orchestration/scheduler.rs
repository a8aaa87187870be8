//! # Scheduler
//!
//! Periodic loop that promotes due, unposted submissions into the
//! orchestrator's queue. The scan is a pure read of the current submission
//! set plus the orchestrator's busy predicates and performs no validation:
//! invalid submissions still get enqueued and surface as dispatch-time
//! failures rather than being silently skipped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::orchestrator::PostOrchestrator;
use crate::cancellation::CancellationToken;
use crate::config::SyndicateConfig;
use crate::models::Schedule;
use crate::store::{StoreResult, SubmissionStore};

/// Promotes scheduled submissions when their `post_at` comes due.
pub struct Scheduler {
    store: Arc<dyn SubmissionStore>,
    orchestrator: Arc<PostOrchestrator>,
    poll_interval: Duration,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        orchestrator: Arc<PostOrchestrator>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            orchestrator,
            poll_interval,
        }
    }

    pub fn from_config(
        store: Arc<dyn SubmissionStore>,
        orchestrator: Arc<PostOrchestrator>,
        config: &SyndicateConfig,
    ) -> Self {
        Self::new(store, orchestrator, config.scheduler_interval())
    }

    /// Run the fixed-period scan loop until `shutdown` fires.
    ///
    /// A failed scan is logged and the loop continues; scan errors are never
    /// fatal to scheduling.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Scheduler starting"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            match self.scan_once().await {
                Ok(0) => {}
                Ok(promoted) => debug!(promoted = promoted, "Scheduler tick promoted submissions"),
                Err(err) => error!(error = %err, "Scheduler scan failed"),
            }
        }

        info!("Scheduler stopped");
    }

    /// One scan: find every submission whose schedule is due and that is
    /// neither queued nor posting, clear its one-shot flag, and enqueue it.
    /// Earlier-due submissions are enqueued first. Returns how many were
    /// promoted.
    pub async fn scan_once(&self) -> StoreResult<usize> {
        let now = Utc::now();

        let mut due: Vec<(DateTime<Utc>, Uuid)> = self
            .store
            .find_all()
            .await?
            .into_iter()
            .filter_map(|submission| {
                let uuid = submission.submission_uuid;
                match submission.schedule.post_at {
                    Some(post_at) if submission.schedule.is_due(now) => Some((post_at, uuid)),
                    _ => None,
                }
            })
            .filter(|(_, uuid)| {
                !self.orchestrator.is_currently_queued(*uuid)
                    && !self.orchestrator.is_currently_posting(*uuid)
            })
            .collect();

        due.sort_by_key(|(post_at, _)| *post_at);

        let mut promoted = 0;
        for (post_at, submission_uuid) in due {
            // One-shot: a scheduled post fires exactly once unless the user
            // reschedules it. Clearing the flag before enqueueing keeps a
            // slow queue from double-promoting on the next tick.
            self.store
                .set_schedule(
                    submission_uuid,
                    Schedule {
                        post_at: Some(post_at),
                        is_scheduled: false,
                    },
                )
                .await?;

            if self.orchestrator.queue(submission_uuid).await {
                debug!(
                    submission_uuid = %submission_uuid,
                    post_at = %post_at,
                    "Promoted due submission"
                );
                promoted += 1;
            }
        }

        Ok(promoted)
    }
}
