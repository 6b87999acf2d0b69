//! Rate limiter behavior over real time.

use std::sync::Arc;
use std::time::Duration;

use jira_gateway::security::RateLimiter;
use tokio::sync::broadcast;

#[tokio::test]
async fn test_window_resets_after_expiry() {
    let limiter = RateLimiter::new(3, Duration::from_millis(1000));

    for _ in 0..3 {
        assert!(limiter.is_allowed("jira"));
    }
    assert!(!limiter.is_allowed("jira"));

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(limiter.is_allowed("jira"));
}

#[tokio::test]
async fn test_keys_are_independent() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));

    assert!(limiter.is_allowed("a"));
    assert!(!limiter.is_allowed("a"));
    assert!(limiter.is_allowed("b"));
}

#[tokio::test]
async fn test_concurrent_callers_never_exceed_quota() {
    let limiter = Arc::new(RateLimiter::new(50, Duration::from_secs(60)));

    let handles: Vec<_> = (0..200)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.is_allowed("shared") })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 50);
}

#[tokio::test]
async fn test_sweeper_evicts_idle_keys_and_stops() {
    let limiter = Arc::new(RateLimiter::new(5, Duration::from_millis(20)));
    let (tx, rx) = broadcast::channel(1);

    limiter.is_allowed("idle");
    assert_eq!(limiter.tracked_keys(), 1);

    let handle = limiter
        .clone()
        .spawn_sweeper(Duration::from_millis(30), rx);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(limiter.tracked_keys(), 0);

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();
}
