#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Syndicate Core
//!
//! Rust core for cross-posting orchestration: compose a submission once and
//! deliver it to many external destinations, each with its own rules, rate
//! limits, and authentication state.
//!
//! ## Overview
//!
//! Destination integrations are thin, swappable adapters; the heart of the
//! crate is the orchestration subsystem that decides *when* a submission is
//! eligible to post, serializes delivery safely, tracks per-destination
//! outcome, tolerates partial failure, supports mid-flight cancellation, and
//! retries transiently-failing attempts without duplicating successes.
//!
//! ## Architecture
//!
//! - Parallel across submissions (bounded worker pool), sequential parts
//!   within one submission.
//! - At most one active post per submission, enforced by a single point of
//!   serialization that also gates every write API.
//! - Cooperative cancellation: a fresh token per dispatch, polled by
//!   adapters at every blocking boundary, never reused.
//! - Exactly one immediate retry per failed part attempt; failure of one
//!   destination never aborts the others.
//!
//! ## Module Organization
//!
//! - [`models`] - Submissions, parts, schedules
//! - [`state_machine`] - Part and submission post state management
//! - [`cancellation`] - Cooperative cancellation token
//! - [`validation`] - Pre-dispatch validation gate and default-part merge
//! - [`adapters`] - The destination adapter contract
//! - [`registry`] - Destination id to adapter lookup
//! - [`store`] - Repository contract plus in-memory implementation
//! - [`events`] - Lifecycle event publishing
//! - [`orchestration`] - The orchestrator, scheduler, and error taxonomy
//! - [`config`] - Runtime configuration
//! - [`error`] - Crate-level error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use syndicate_core::cancellation::CancellationToken;
//! use syndicate_core::config::SyndicateConfig;
//! use syndicate_core::events::EventPublisher;
//! use syndicate_core::orchestration::{OrchestratorConfig, PostOrchestrator, Scheduler};
//! use syndicate_core::registry::AdapterRegistry;
//! use syndicate_core::store::InMemorySubmissionStore;
//!
//! # async fn example() {
//! let config = SyndicateConfig::default();
//! let store = Arc::new(InMemorySubmissionStore::new());
//! let events = EventPublisher::new(config.event_channel_capacity);
//! let registry = AdapterRegistry::with_event_publisher(events.clone());
//!
//! let orchestrator = Arc::new(PostOrchestrator::new(
//!     store.clone(),
//!     registry,
//!     events,
//!     OrchestratorConfig::from_config(&config),
//! ));
//! let scheduler = Scheduler::from_config(store, orchestrator.clone(), &config);
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(orchestrator.run(shutdown.clone()));
//! scheduler.run(shutdown).await;
//! # }
//! ```

pub mod adapters;
pub mod cancellation;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod state_machine;
pub mod store;
pub mod validation;

pub use adapters::{
    AdapterCapabilities, DestinationAdapter, LoginStatus, PostData, PostResponse,
};
pub use cancellation::CancellationToken;
pub use config::SyndicateConfig;
pub use error::{Result, SyndicateError};
pub use events::EventPublisher;
pub use models::{Schedule, Submission, SubmissionFile, SubmissionPart};
pub use orchestration::{
    OrchestratorConfig, PostError, PostOrchestrator, PostOutcome, Scheduler,
    SubmissionPostResult,
};
pub use registry::AdapterRegistry;
pub use state_machine::{PostStatus, SubmissionRunState};
pub use store::{InMemorySubmissionStore, SubmissionStore};
pub use validation::{ValidationEngine, ValidationResult};
