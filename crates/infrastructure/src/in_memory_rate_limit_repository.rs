use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use warden_application::{RateLimitDecision, RateLimitRepository, RateLimitRule};
use warden_core::AppResult;

/// Sliding-window admission state kept in process memory.
///
/// Keys are never evicted: a client that stops sending requests keeps its
/// (expired) timestamps until it is seen again.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct keys ever recorded.
    pub async fn tracked_keys(&self) -> usize {
        self.attempts.lock().await.len()
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn record_attempt(&self, key: &str, rule: &RateLimitRule) -> AppResult<RateLimitDecision> {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().await;
        let timestamps = attempts.entry(key.to_owned()).or_default();

        if let Some(window_start) = now.checked_sub(rule.window) {
            while timestamps
                .front()
                .is_some_and(|recorded| *recorded < window_start)
            {
                timestamps.pop_front();
            }
        }

        if timestamps.len() < usize::try_from(rule.max_attempts).unwrap_or(usize::MAX) {
            timestamps.push_back(now);
            return Ok(RateLimitDecision::Allowed);
        }

        let retry_after = timestamps
            .front()
            .map(|oldest| (*oldest + rule.window).saturating_duration_since(now))
            .unwrap_or(rule.window)
            .max(Duration::from_secs(1));

        Ok(RateLimitDecision::Limited { retry_after })
    }
}
