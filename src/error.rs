//! Crate-level error types.
//!
//! Module-local error enums (`PostError`, `RegistryError`, `PublishError`,
//! `StoreError`, `StateMachineError`) stay close to the code that raises them
//! and convert into [`SyndicateError`] where propagation crosses module
//! boundaries.

use thiserror::Error;

/// Top-level error for embedding applications.
#[derive(Debug, Error)]
pub enum SyndicateError {
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("orchestration error: {0}")]
    Orchestration(#[from] crate::orchestration::PostError),

    #[error("registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    #[error("event error: {0}")]
    Event(#[from] crate::events::PublishError),

    #[error("state transition error: {0}")]
    StateTransition(#[from] crate::state_machine::StateMachineError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, SyndicateError>;
