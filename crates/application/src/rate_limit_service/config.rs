use std::time::Duration;

/// Configuration for a rate limit rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Category prefixed to every key (e.g. `"api"`).
    pub category: String,
    /// Maximum number of admitted requests inside one window.
    pub max_attempts: u32,
    /// Length of the trailing window.
    pub window: Duration,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: u32, window: Duration) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window,
        }
    }

    /// Creates a rule with a window expressed in whole seconds.
    #[must_use]
    pub fn per_seconds(category: impl Into<String>, max_attempts: u32, seconds: u64) -> Self {
        Self::new(category, max_attempts, Duration::from_secs(seconds))
    }
}
