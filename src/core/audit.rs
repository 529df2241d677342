//! Audit sink implementations.
//!
//! Every admission, promotion, release, and attendance mark is recorded with
//! the ids involved. Misses are only visible here, since they do not touch
//! the record.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{ClassId, EnrollmentId, EnrollmentRecord, MemberId};

/// Action taken on an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Created as enrolled.
    Admit,
    /// Created as waitlisted.
    Waitlist,
    /// Waitlisted record moved into a seat.
    Promote,
    /// Record cancelled.
    Cancel,
    /// Record completed.
    Complete,
    /// Attendance counted.
    Attend,
    /// Missed session logged.
    Miss,
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: Uuid,
    /// Affected enrollment.
    pub enrollment_id: EnrollmentId,
    /// Class of the enrollment.
    pub class_id: ClassId,
    /// Member of the enrollment.
    pub member_id: MemberId,
    /// Action taken.
    pub action: AuditAction,
    /// When the action was applied.
    pub created_at: DateTime<Utc>,
    /// Additional context.
    pub notes: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Events recorded for one enrollment, oldest first.
    pub fn events_for(&self, enrollment_id: EnrollmentId) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.enrollment_id == enrollment_id)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Build an audit event for `record`.
pub fn build_audit_event(
    record: &EnrollmentRecord,
    action: AuditAction,
    at: DateTime<Utc>,
    notes: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: Uuid::new_v4(),
        enrollment_id: record.id,
        class_id: record.class_id.clone(),
        member_id: record.member_id.clone(),
        action,
        created_at: at,
        notes,
    }
}
