use std::time::Duration;

use linkharvest::{ConfigError, Crawler, RetryPolicy};

#[test]
fn test_zero_workers_rejected() {
    let result = Crawler::builder().workers(0).build();

    assert!(result.is_err());
    match result {
        Err(ConfigError::InvalidWorkerCount(0)) => {}
        _ => panic!("Expected InvalidWorkerCount error"),
    }
}

#[test]
fn test_zero_max_attempts_rejected() {
    let result = Crawler::builder().max_attempts(0).build();

    assert!(result.is_err());
    match result {
        Err(ConfigError::InvalidMaxAttempts(0)) => {}
        _ => panic!("Expected InvalidMaxAttempts error"),
    }
}

#[test]
fn test_default_configuration_valid() {
    let result = Crawler::builder().build();
    assert!(result.is_ok());
}

#[test]
fn test_valid_configuration_accepted() {
    let result = Crawler::builder()
        .workers(4)
        .max_attempts(5)
        .initial_backoff(Duration::from_millis(100))
        .max_backoff(Duration::from_secs(2))
        .build();

    assert!(result.is_ok());
}

#[test]
fn test_backoff_doubles_per_attempt() {
    let policy = RetryPolicy {
        max_attempts: 5,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_secs(60),
    };

    assert_eq!(policy.backoff(1), Duration::from_millis(100));
    assert_eq!(policy.backoff(2), Duration::from_millis(200));
    assert_eq!(policy.backoff(3), Duration::from_millis(400));
}

#[test]
fn test_backoff_is_capped() {
    let policy = RetryPolicy {
        max_attempts: 20,
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(10),
    };

    assert_eq!(policy.backoff(10), Duration::from_secs(10));
    assert_eq!(policy.backoff(19), Duration::from_secs(10), "backoff must not overflow");
}
