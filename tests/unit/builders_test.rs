//! Tests for builder modules

use std::sync::Arc;

use class_enrollment::builders::ServiceBuilder;
use class_enrollment::config::EnrollmentConfig;
use class_enrollment::core::{ClassCapacity, EnrollmentError, NewEnrollment};
use class_enrollment::infra::{InMemoryDirectory, InMemoryEnrollmentStore};

#[test]
fn test_service_builder_keeps_config() {
    let config = EnrollmentConfig {
        max_attempts: 9,
        ..EnrollmentConfig::default()
    };
    let builder = ServiceBuilder::new(config, Arc::new(InMemoryEnrollmentStore::new()));
    assert_eq!(builder.config().max_attempts, 9);
}

#[test]
fn test_service_builder_requires_lookups() {
    let builder = ServiceBuilder::new(
        EnrollmentConfig::default(),
        Arc::new(InMemoryEnrollmentStore::new()),
    );
    let err = builder.build().err().unwrap();
    assert!(matches!(err, EnrollmentError::Backend(_)));
}

#[test]
fn test_service_builder_rejects_invalid_config() {
    let config = EnrollmentConfig {
        lock_timeout_ms: 0,
        ..EnrollmentConfig::default()
    };
    let err = ServiceBuilder::in_memory(config, Arc::new(InMemoryDirectory::new()))
        .build()
        .err()
        .unwrap();
    assert!(err.to_string().contains("lock_timeout_ms"));
}

#[tokio::test]
async fn test_service_builder_with_separate_lookups() {
    let classes = Arc::new(InMemoryDirectory::new());
    classes.upsert_class("hiit", ClassCapacity::limited(1));
    let members = Arc::new(InMemoryDirectory::new());
    members.add_member("m1");

    let (builder, audit) = ServiceBuilder::new(
        EnrollmentConfig::default(),
        Arc::new(InMemoryEnrollmentStore::new()),
    )
    .classes(classes)
    .members(members)
    .in_memory_audit();
    let service = builder.build().unwrap();

    let record = service
        .create_enrollment(NewEnrollment::new("hiit", "m1"))
        .await
        .unwrap();
    assert_eq!(audit.events_for(record.id).len(), 1);
    assert_eq!(service.store().len(), 1);
}
