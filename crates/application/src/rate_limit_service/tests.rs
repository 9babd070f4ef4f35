use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use warden_core::AppResult;

use super::{RateLimitDecision, RateLimitRepository, RateLimitRule, RateLimitService};

#[derive(Default)]
struct CountingRepository {
    counts: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl RateLimitRepository for CountingRepository {
    async fn record_attempt(&self, key: &str, rule: &RateLimitRule) -> AppResult<RateLimitDecision> {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(key.to_owned()).or_default();
        if *count >= rule.max_attempts {
            return Ok(RateLimitDecision::Limited {
                retry_after: rule.window,
            });
        }

        *count += 1;
        Ok(RateLimitDecision::Allowed)
    }
}

#[tokio::test]
async fn allow_rejects_once_limit_is_reached() {
    let service = RateLimitService::new(
        Arc::new(CountingRepository::default()),
        RateLimitRule::per_seconds("api", 2, 60),
    );

    let first = service.allow("10.0.0.1").await.unwrap_or_default();
    let second = service.allow("10.0.0.1").await.unwrap_or_default();
    let third = service.allow("10.0.0.1").await.unwrap_or(true);

    assert!(first);
    assert!(second);
    assert!(!third);
}

#[tokio::test]
async fn keys_are_counted_independently_under_the_rule_category() {
    let repository = Arc::new(CountingRepository::default());
    let service = RateLimitService::new(repository.clone(), RateLimitRule::per_seconds("api", 1, 60));

    assert!(service.allow("10.0.0.1").await.unwrap_or_default());
    assert!(service.allow("10.0.0.2").await.unwrap_or_default());

    let counts = repository.counts.lock().await;
    assert_eq!(counts.get("api:10.0.0.1"), Some(&1));
    assert_eq!(counts.get("api:10.0.0.2"), Some(&1));
}

#[tokio::test]
async fn check_rate_limit_reports_retry_interval() {
    let service = RateLimitService::new(
        Arc::new(CountingRepository::default()),
        RateLimitRule::new("api", 0, Duration::from_secs(30)),
    );

    let decision = service.check_rate_limit("client").await;

    assert!(matches!(
        decision,
        Ok(RateLimitDecision::Limited { retry_after }) if retry_after == Duration::from_secs(30)
    ));
}
