use serde::{Deserialize, Serialize};
use std::fmt;

/// Events that drive a part through its post lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartEvent {
    /// Selected for a run.
    Enqueue,
    /// Adapter call starting.
    Start,
    /// Adapter reported success with the destination-assigned identifier.
    Succeed(String),
    /// Terminal failure for this run, with the message to retain.
    Fail(String),
    /// A later run picks a failed part back up.
    Requeue,
}

impl fmt::Display for PartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enqueue => write!(f, "enqueue"),
            Self::Start => write!(f, "start"),
            Self::Succeed(_) => write!(f, "succeed"),
            Self::Fail(_) => write!(f, "fail"),
            Self::Requeue => write!(f, "requeue"),
        }
    }
}
