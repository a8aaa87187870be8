//! # Post Orchestration Engine
//!
//! The components that decide when a submission is eligible to post and
//! deliver it safely:
//!
//! - **PostOrchestrator**: work queue, at-most-one-active-post-per-submission
//!   guard, bounded-parallelism dispatch with retry and partial-failure
//!   policy.
//! - **Scheduler**: periodic loop promoting due, unposted submissions into
//!   the orchestrator's queue.
//! - **PostError**: the failure taxonomy the retry policy hangs off.
//!
//! Concurrency model: parallel across submissions (bounded by a semaphore),
//! sequential parts within one submission (destinations are often
//! rate-limited per session). The pending queue and active set live under a
//! single lock because every write API's "is this submission busy?" check
//! goes through them.

pub mod errors;
pub mod orchestrator;
pub mod scheduler;
pub mod types;

pub use errors::{PostError, PostResult};
pub use orchestrator::{OrchestratorConfig, PostOrchestrator};
pub use scheduler::Scheduler;
pub use types::{PostOutcome, SkippedPart, SubmissionPostResult};
