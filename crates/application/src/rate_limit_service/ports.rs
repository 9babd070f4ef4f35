use std::time::Duration;

use async_trait::async_trait;

use warden_core::AppResult;

use super::config::RateLimitRule;

/// Outcome of one admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The attempt was admitted and recorded.
    Allowed,
    /// The attempt was rejected and nothing was recorded.
    Limited {
        /// Time until the oldest recorded attempt leaves the window.
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    /// Returns whether the attempt was admitted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Repository port for sliding-window admission state.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Purges timestamps older than the window, then records the attempt if
    /// fewer than `rule.max_attempts` remain.
    ///
    /// Purge, count, and append run as one critical section per key.
    async fn record_attempt(&self, key: &str, rule: &RateLimitRule) -> AppResult<RateLimitDecision>;
}
