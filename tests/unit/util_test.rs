//! Tests for utility modules

use std::time::Duration;

use chrono::{TimeDelta, TimeZone, Utc};
use class_enrollment::util::{init_tracing, Clock, ManualClock, RetryPolicy};

#[test]
fn test_retry_policy_backoff_doubles_and_caps() {
    let policy = RetryPolicy {
        max_attempts: 6,
        base_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
    };
    assert_eq!(policy.backoff_for(1), Duration::from_millis(10));
    assert_eq!(policy.backoff_for(2), Duration::from_millis(20));
    assert_eq!(policy.backoff_for(3), Duration::from_millis(40));
    assert_eq!(policy.backoff_for(4), Duration::from_millis(50));
    assert_eq!(policy.backoff_for(40), Duration::from_millis(50));
}

#[test]
fn test_manual_clock_set_and_advance() {
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    clock.advance(TimeDelta::minutes(30));
    assert_eq!(clock.now(), start + TimeDelta::minutes(30));

    let later = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    clock.set(later);
    assert_eq!(clock.now(), later);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing("class_enrollment=debug");
    init_tracing("class_enrollment=info");
    tracing::info!("tracing initialized twice without panicking");
}
