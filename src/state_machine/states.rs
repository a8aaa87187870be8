use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-part post status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Initial state; the part has never been attempted (or was reset).
    #[default]
    Unposted,
    /// Selected for the current orchestrator run.
    Queued,
    /// An adapter call is in flight.
    Posting,
    /// Delivered; `posted_to` carries the destination identifier.
    Posted,
    /// Terminal for this run, with the error retained for display.
    Failed,
}

impl PostStatus {
    /// Terminal for the part across runs; a posted part is never retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Posted)
    }

    /// The part has reached an end state for the current run.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Posted | Self::Failed)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Posting)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unposted => write!(f, "unposted"),
            Self::Queued => write!(f, "queued"),
            Self::Posting => write!(f, "posting"),
            Self::Posted => write!(f, "posted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unposted" => Ok(Self::Unposted),
            "queued" => Ok(Self::Queued),
            "posting" => Ok(Self::Posting),
            "posted" => Ok(Self::Posted),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid post status: {s}")),
        }
    }
}

/// Lifecycle of one submission inside the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionRunState {
    /// Waiting in the pending queue.
    Queued,
    /// A dispatch task owns the submission.
    Posting,
    /// Every eligible part reached a settled status. Does not imply success.
    Completed,
    /// The cancellation token fired before all parts settled.
    Cancelled,
}

impl SubmissionRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for SubmissionRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Posting => write!(f, "posting"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
