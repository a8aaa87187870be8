//! Post state management for submissions and their parts.
//!
//! A part moves `Unposted → Queued → Posting → {Posted | Failed}`. `Posted`
//! is terminal; a `Failed` part may be requeued by a later orchestrator run.
//! Transitions are computed by [`PartStateMachine`], which rejects anything
//! outside that chain.

pub mod errors;
pub mod events;
pub mod part_state_machine;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::PartEvent;
pub use part_state_machine::PartStateMachine;
pub use states::{PostStatus, SubmissionRunState};
