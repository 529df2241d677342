//! Tests for error types

use class_enrollment::core::{EnrollmentError, EnrollmentId, EnrollmentStatus, EntityKind};

#[test]
fn test_not_found_error() {
    let err = EnrollmentError::not_found(EntityKind::Class, "spin-6am");
    assert_eq!(format!("{}", err), "class not found: spin-6am");

    let err = EnrollmentError::not_found(EntityKind::Member, "m-1");
    assert_eq!(format!("{}", err), "member not found: m-1");
}

#[test]
fn test_conflict_error() {
    let err = EnrollmentError::Conflict("member m1 is already enrolled".to_string());
    assert_eq!(format!("{}", err), "conflict: member m1 is already enrolled");
}

#[test]
fn test_invalid_state_error() {
    let id = EnrollmentId::new_v4();
    let err = EnrollmentError::invalid_state(id, EnrollmentStatus::Waitlist, "mark attendance for");
    assert_eq!(
        format!("{}", err),
        format!("invalid state: cannot mark attendance for enrollment {id} while waitlist")
    );
}

#[test]
fn test_backend_error() {
    let err = EnrollmentError::Backend("connection failed".to_string());
    assert_eq!(format!("{}", err), "backend error: connection failed");
}

#[test]
fn test_only_concurrency_is_retryable() {
    assert!(EnrollmentError::Concurrency("class spin is busy".into()).is_retryable());
    assert!(!EnrollmentError::Conflict("dup".into()).is_retryable());
    assert!(!EnrollmentError::Backend("down".into()).is_retryable());
    assert!(!EnrollmentError::InvalidRequest("bad".into()).is_retryable());
    assert!(!EnrollmentError::not_found(EntityKind::Enrollment, "x").is_retryable());
}
