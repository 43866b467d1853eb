use shopwright_application::RateLimitRepository;
use shopwright_core::UserId;

use super::RedisRateLimitRepository;

fn test_repository() -> Option<RedisRateLimitRepository> {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        return None;
    };

    let client = match redis::Client::open(redis_url) {
        Ok(client) => client,
        Err(error) => panic!("failed to open REDIS_URL in test: {error}"),
    };

    Some(RedisRateLimitRepository::new(client, "shopwright-test"))
}

#[tokio::test]
async fn attempts_increment_within_one_window() {
    let Some(repository) = test_repository() else {
        return;
    };
    let key = format!("shop_switch:{}", UserId::new());

    let first = repository.record_attempt(&key, 60).await;
    let Ok(first) = first else {
        panic!("record_attempt failed");
    };
    assert_eq!(first.attempt_count, 1);

    let second = repository.record_attempt(&key, 60).await;
    let Ok(second) = second else {
        panic!("record_attempt failed");
    };
    assert_eq!(second.attempt_count, 2);
    // TTL granularity is one second, so the shared window start may drift
    // by at most that much between the two reads.
    let drift = (second.window_started_at - first.window_started_at)
        .num_seconds()
        .abs();
    assert!(drift <= 1, "window start drifted by {drift}s");
}

#[tokio::test]
async fn an_expired_key_resets_the_counter() {
    let Some(repository) = test_repository() else {
        return;
    };
    let key = format!("shop_switch:{}", UserId::new());

    let first = repository.record_attempt(&key, 1).await;
    let Ok(first) = first else {
        panic!("record_attempt failed");
    };
    assert_eq!(first.attempt_count, 1);

    // The 1 second TTL lets the key lapse.
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

    let reset = repository.record_attempt(&key, 1).await;
    let Ok(reset) = reset else {
        panic!("record_attempt failed");
    };
    assert_eq!(reset.attempt_count, 1);
}

#[tokio::test]
async fn non_positive_window_is_rejected() {
    let Some(repository) = test_repository() else {
        return;
    };

    let result = repository.record_attempt("bad:window", 0).await;
    assert!(result.is_err());
}
