//! Tests for audit sink

use chrono::Utc;
use class_enrollment::core::{
    build_audit_event, AuditAction, AuditSink, EnrollmentRecord, EnrollmentStatus,
    InMemoryAuditSink,
};

fn record(member: &str) -> EnrollmentRecord {
    let now = Utc::now();
    EnrollmentRecord::new("spin".into(), member.into(), now, EnrollmentStatus::Enrolled, now)
}

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);
    let enrollment = record("m1");

    let event = build_audit_event(
        &enrollment,
        AuditAction::Admit,
        enrollment.created_at,
        Some("walk-in".to_string()),
    );
    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0], event);
    assert_eq!(events[0].enrollment_id, enrollment.id);
    assert_eq!(events[0].class_id.as_str(), "spin");
    assert_eq!(events[0].member_id.as_str(), "m1");
    assert_eq!(events[0].action, AuditAction::Admit);
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);
    let records: Vec<_> = ["m1", "m2", "m3"].into_iter().map(record).collect();
    for r in &records {
        sink.record(build_audit_event(r, AuditAction::Admit, r.created_at, None));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].enrollment_id, records[1].id); // First one popped
    assert_eq!(events[1].enrollment_id, records[2].id);
}

#[test]
fn test_audit_events_for_enrollment() {
    let sink = InMemoryAuditSink::new(10);
    let a = record("m1");
    let b = record("m2");
    sink.record(build_audit_event(&a, AuditAction::Admit, a.created_at, None));
    sink.record(build_audit_event(&b, AuditAction::Waitlist, b.created_at, None));
    sink.record(build_audit_event(&a, AuditAction::Cancel, a.created_at, None));

    let actions: Vec<_> = sink.events_for(a.id).iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Admit, AuditAction::Cancel]);
}

#[test]
fn test_audit_action_wire_names() {
    assert_eq!(serde_json::to_string(&AuditAction::Promote).unwrap(), r#""promote""#);
    assert_eq!(serde_json::to_string(&AuditAction::Miss).unwrap(), r#""miss""#);
}
