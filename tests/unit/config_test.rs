//! Tests for configuration validation

use std::time::Duration;

use class_enrollment::config::EnrollmentConfig;

#[test]
fn test_default_config_is_valid() {
    let config = EnrollmentConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.default_page_limit, 10);
    assert_eq!(config.max_page_limit, 100);
}

#[test]
fn test_config_invalid_lock_timeout() {
    let invalid = EnrollmentConfig {
        lock_timeout_ms: 0,
        ..EnrollmentConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_attempts() {
    let invalid = EnrollmentConfig {
        max_attempts: 0,
        ..EnrollmentConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_backoff_bounds() {
    let invalid = EnrollmentConfig {
        base_backoff_ms: 500,
        max_backoff_ms: 100,
        ..EnrollmentConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_page_limits() {
    let zero = EnrollmentConfig {
        default_page_limit: 0,
        ..EnrollmentConfig::default()
    };
    assert!(zero.validate().is_err());

    let inverted = EnrollmentConfig {
        default_page_limit: 50,
        max_page_limit: 20,
        ..EnrollmentConfig::default()
    };
    assert!(inverted.validate().is_err());
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config = EnrollmentConfig::from_json_str(r#"{"lock_timeout_ms": 250, "max_attempts": 5}"#)
        .unwrap();
    assert_eq!(config.lock_timeout(), Duration::from_millis(250));
    assert_eq!(config.retry_policy().max_attempts, 5);
    assert_eq!(config.page_limits().default_limit, 10);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(EnrollmentConfig::from_json_str(r#"{"max_attempts": 0}"#).is_err());
    assert!(EnrollmentConfig::from_json_str("not json").is_err());
}

// All environment cases live in one test; env vars are process-global.
#[test]
fn test_config_from_env() {
    std::env::remove_var("ENROLLMENT_LOCK_TIMEOUT_MS");
    std::env::set_var("ENROLLMENT_MAX_ATTEMPTS", "7");
    std::env::set_var("ENROLLMENT_LOG_FILTER", "class_enrollment=debug");
    let config = EnrollmentConfig::from_env().unwrap();
    assert_eq!(config.max_attempts, 7);
    assert_eq!(config.log_filter, "class_enrollment=debug");
    assert_eq!(config.lock_timeout_ms, EnrollmentConfig::default().lock_timeout_ms);

    std::env::set_var("ENROLLMENT_LOCK_TIMEOUT_MS", "soon");
    let err = EnrollmentConfig::from_env().unwrap_err();
    assert!(format!("{err:#}").contains("ENROLLMENT_LOCK_TIMEOUT_MS"));

    std::env::set_var("ENROLLMENT_LOCK_TIMEOUT_MS", "0");
    assert!(EnrollmentConfig::from_env().is_err());

    std::env::remove_var("ENROLLMENT_LOCK_TIMEOUT_MS");
    std::env::remove_var("ENROLLMENT_MAX_ATTEMPTS");
    std::env::remove_var("ENROLLMENT_LOG_FILTER");
}
