use std::sync::Arc;

use warden_core::AppResult;

use super::config::RateLimitRule;
use super::ports::{RateLimitDecision, RateLimitRepository};

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
    rule: RateLimitRule,
}

impl RateLimitService {
    /// Creates a new rate limit service enforcing one rule.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>, rule: RateLimitRule) -> Self {
        Self { repository, rule }
    }

    /// Records an attempt for the client key and reports the decision.
    pub async fn check_rate_limit(&self, key: &str) -> AppResult<RateLimitDecision> {
        let composite_key = format!("{}:{key}", self.rule.category);
        let decision = self
            .repository
            .record_attempt(&composite_key, &self.rule)
            .await?;

        if let RateLimitDecision::Limited { retry_after } = decision {
            tracing::warn!(
                key = composite_key.as_str(),
                retry_after_seconds = retry_after.as_secs(),
                "rate limit exceeded"
            );
        }

        Ok(decision)
    }

    /// Returns `true` when the attempt is admitted.
    pub async fn allow(&self, key: &str) -> AppResult<bool> {
        Ok(self.check_rate_limit(key).await?.is_allowed())
    }
}
