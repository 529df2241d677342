//! Tests for the request/response surface

use std::sync::Arc;

use class_enrollment::builders::ServiceBuilder;
use class_enrollment::config::EnrollmentConfig;
use class_enrollment::core::{
    ClassCapacity, EnrollmentError, EnrollmentService, EnrollmentStatus, EntityKind,
};
use class_enrollment::infra::{InMemoryDirectory, InMemoryEnrollmentStore};
use class_enrollment::runtime::api::{
    self, ApiError, AttendanceRequest, CreateEnrollmentRequest, ErrorKind, ListEnrollmentsQuery,
    UpdateStatusRequest,
};
use serde_json::json;

fn service(capacity: u32) -> EnrollmentService<InMemoryEnrollmentStore> {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.upsert_class("yoga", ClassCapacity::limited(capacity));
    directory.add_members(["m1", "m2", "m3"]);
    ServiceBuilder::in_memory(EnrollmentConfig::default(), directory)
        .build()
        .unwrap()
}

fn create(class: &str, member: &str) -> CreateEnrollmentRequest {
    serde_json::from_value(json!({ "classId": class, "memberId": member })).unwrap()
}

#[test]
fn test_create_request_parses_camel_case() {
    let req: CreateEnrollmentRequest = serde_json::from_value(json!({
        "classId": "yoga",
        "memberId": "m1",
        "enrollmentDate": "2026-03-01T06:00:00Z",
        "status": "waitlist"
    }))
    .unwrap();
    assert_eq!(req.class_id.as_str(), "yoga");
    assert_eq!(req.status, Some(EnrollmentStatus::Waitlist));
    assert!(req.enrollment_date.is_some());
}

#[test]
fn test_error_kind_mapping() {
    let cases = [
        (EnrollmentError::not_found(EntityKind::Member, "m9"), ErrorKind::NotFound),
        (EnrollmentError::Conflict("dup".into()), ErrorKind::Conflict),
        (EnrollmentError::InvalidRequest("bad".into()), ErrorKind::InvalidRequest),
        (EnrollmentError::Concurrency("busy".into()), ErrorKind::Busy),
        (EnrollmentError::Backend("down".into()), ErrorKind::Internal),
    ];
    for (err, kind) in cases {
        let message = err.to_string();
        let api: ApiError = err.into();
        assert_eq!(api.kind, kind);
        assert_eq!(api.message, message);
    }
}

#[test]
fn test_api_error_serializes_snake_case_kind() {
    let api: ApiError = EnrollmentError::Concurrency("class yoga is busy".into()).into();
    let body = serde_json::to_value(&api).unwrap();
    assert_eq!(body["kind"], "busy");
}

#[tokio::test]
async fn test_create_cancel_round_trip_reports_promotion() {
    let service = service(1);
    let first = api::create_enrollment(&service, create("yoga", "m1")).await.unwrap();
    let second = api::create_enrollment(&service, create("yoga", "m2")).await.unwrap();
    assert_eq!(second.status, EnrollmentStatus::Waitlist);

    let response = api::cancel_enrollment(&service, first.id).await.unwrap();
    assert_eq!(response.message, "Enrollment cancelled successfully");
    assert_eq!(response.promoted_enrollment_id, Some(second.id));

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["promotedEnrollmentId"], json!(second.id.to_string()));
}

#[tokio::test]
async fn test_duplicate_create_maps_to_conflict() {
    let service = service(5);
    api::create_enrollment(&service, create("yoga", "m1")).await.unwrap();
    let err = api::create_enrollment(&service, create("yoga", "m1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_unknown_member_maps_to_not_found() {
    let service = service(5);
    let err = api::create_enrollment(&service, create("yoga", "ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("ghost"));
}

#[tokio::test]
async fn test_mark_attendance_for_waitlisted_is_invalid_state() {
    let service = service(1);
    api::create_enrollment(&service, create("yoga", "m1")).await.unwrap();
    let waiting = api::create_enrollment(&service, create("yoga", "m2")).await.unwrap();

    let req: AttendanceRequest = serde_json::from_value(json!({ "attended": true })).unwrap();
    let err = api::mark_attendance(&service, waiting.id, req).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_mark_attendance_echoes_date() {
    let service = service(1);
    let record = api::create_enrollment(&service, create("yoga", "m1")).await.unwrap();

    let req: AttendanceRequest = serde_json::from_value(json!({
        "attended": true,
        "attendanceDate": "2026-03-02T07:00:00Z",
        "notes": "front row"
    }))
    .unwrap();
    let receipt = api::mark_attendance(&service, record.id, req).await.unwrap();
    assert!(receipt.attended);
    assert_eq!(receipt.date.to_rfc3339(), "2026-03-02T07:00:00+00:00");

    let stored = api::get_enrollment(&service, record.id).await.unwrap();
    assert_eq!(stored.attendance_count, 1);
}

#[tokio::test]
async fn test_update_status_to_completed() {
    let service = service(1);
    let record = api::create_enrollment(&service, create("yoga", "m1")).await.unwrap();

    let req = UpdateStatusRequest {
        status: EnrollmentStatus::Completed,
    };
    let updated = api::update_status(&service, record.id, req).await.unwrap();
    assert_eq!(updated.status, EnrollmentStatus::Completed);
}

#[tokio::test]
async fn test_list_and_summary_handlers() {
    let service = service(2);
    for member in ["m1", "m2", "m3"] {
        api::create_enrollment(&service, create("yoga", member)).await.unwrap();
    }

    let query: ListEnrollmentsQuery =
        serde_json::from_value(json!({ "classId": "yoga", "status": "enrolled", "limit": 1 }))
            .unwrap();
    let page = api::list_enrollments(&service, query).await.unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.pagination.total, 2);
    assert_eq!(page.pagination.total_pages, 2);

    let summary = api::class_summary(&service, &"yoga".into()).await.unwrap();
    assert_eq!(summary.enrolled_count, 2);
    assert_eq!(summary.waitlist_count, 1);
    assert_eq!(summary.available_spots, Some(0));
}
