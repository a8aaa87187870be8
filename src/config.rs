use crate::error::{Result, SyndicateError};
use std::collections::HashMap;
use std::time::Duration;

/// Runtime configuration for the posting core.
#[derive(Debug, Clone)]
pub struct SyndicateConfig {
    /// How often the scheduler scans for due submissions.
    pub scheduler_interval_ms: u64,
    /// Maximum submission-level posts in flight at once.
    pub max_concurrent_submissions: usize,
    /// Immediate retries per part after a failed attempt.
    pub post_retry_limit: u32,
    /// Capacity of the broadcast event channel.
    pub event_channel_capacity: usize,
    pub custom_settings: HashMap<String, String>,
}

impl Default for SyndicateConfig {
    fn default() -> Self {
        Self {
            scheduler_interval_ms: 60_000,
            max_concurrent_submissions: 3,
            post_retry_limit: 1,
            event_channel_capacity: 1000,
            custom_settings: HashMap::new(),
        }
    }
}

impl SyndicateConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(interval) = std::env::var("SYNDICATE_SCHEDULER_INTERVAL_MS") {
            config.scheduler_interval_ms = interval.parse().map_err(|e| {
                SyndicateError::Configuration(format!("Invalid scheduler_interval_ms: {e}"))
            })?;
        }

        if let Ok(max_concurrent) = std::env::var("SYNDICATE_MAX_CONCURRENT_SUBMISSIONS") {
            config.max_concurrent_submissions = max_concurrent.parse().map_err(|e| {
                SyndicateError::Configuration(format!("Invalid max_concurrent_submissions: {e}"))
            })?;
        }

        if let Ok(retry_limit) = std::env::var("SYNDICATE_POST_RETRY_LIMIT") {
            config.post_retry_limit = retry_limit.parse().map_err(|e| {
                SyndicateError::Configuration(format!("Invalid post_retry_limit: {e}"))
            })?;
        }

        Ok(config)
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_millis(self.scheduler_interval_ms)
    }

    /// Configuration tuned for fast integration tests.
    pub fn for_testing() -> Self {
        Self {
            scheduler_interval_ms: 50,
            max_concurrent_submissions: 2,
            post_retry_limit: 1,
            event_channel_capacity: 64,
            custom_settings: HashMap::new(),
        }
    }
}
