//! Enrollment record model, identifiers, and status lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::EnrollmentError;

/// Identifier of a class, owned by the class catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

/// Identifier of a member, owned by the membership directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Wrap a raw identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

string_id!(ClassId);
string_id!(MemberId);

/// Unique identifier of an enrollment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(Uuid);

impl EnrollmentId {
    /// Generate a fresh random identifier.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EnrollmentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Holds a seat in the class.
    Enrolled,
    /// Queued for a seat.
    Waitlist,
    /// Withdrawn; terminal.
    Cancelled,
    /// Finished the class; terminal.
    Completed,
}

impl EnrollmentStatus {
    /// Active records count against the one-per-member rule.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Enrolled | Self::Waitlist)
    }

    /// Terminal records accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Waitlist => "waitlist",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Waitlist, Self::Enrolled | Self::Cancelled)
                | (Self::Enrolled, Self::Cancelled | Self::Completed)
        )
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member's enrollment in a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    /// Record identifier.
    pub id: EnrollmentId,
    /// Class the member enrolled in.
    pub class_id: ClassId,
    /// Enrolled member.
    pub member_id: MemberId,
    /// Waitlist ordering key.
    pub enrollment_date: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: EnrollmentStatus,
    /// Attended sessions while enrolled.
    pub attendance_count: u32,
    /// Insertion order assigned by the store; breaks `enrollment_date` ties.
    pub sequence: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status or counter change.
    pub updated_at: DateTime<Utc>,
}

impl EnrollmentRecord {
    /// Build a fresh record. The store assigns `sequence` on insert.
    pub fn new(
        class_id: ClassId,
        member_id: MemberId,
        enrollment_date: DateTime<Utc>,
        status: EnrollmentStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EnrollmentId::new_v4(),
            class_id,
            member_id,
            enrollment_date,
            status,
            attendance_count: 0,
            sequence: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, rejecting terminal sources and illegal edges.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::InvalidState`] when the transition is not allowed.
    pub fn transition(
        &mut self,
        next: EnrollmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), EnrollmentError> {
        if !self.status.can_become(next) {
            return Err(EnrollmentError::invalid_state(
                self.id,
                self.status,
                transition_verb(next),
            ));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Count an attended session. A miss is accepted without mutation.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::InvalidState`] unless the record is enrolled.
    pub fn record_attendance(
        &mut self,
        attended: bool,
        now: DateTime<Utc>,
    ) -> Result<(), EnrollmentError> {
        if self.status != EnrollmentStatus::Enrolled {
            return Err(EnrollmentError::invalid_state(
                self.id,
                self.status,
                "mark attendance on",
            ));
        }
        if attended {
            self.attendance_count = self.attendance_count.saturating_add(1);
            self.updated_at = now;
        }
        Ok(())
    }

    /// FIFO key for waitlist ordering.
    pub fn queue_key(&self) -> (DateTime<Utc>, u64) {
        (self.enrollment_date, self.sequence)
    }
}

const fn transition_verb(next: EnrollmentStatus) -> &'static str {
    match next {
        EnrollmentStatus::Enrolled => "enroll",
        EnrollmentStatus::Waitlist => "waitlist",
        EnrollmentStatus::Cancelled => "cancel",
        EnrollmentStatus::Completed => "complete",
    }
}

/// Per-status record counts for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Records holding a seat.
    pub enrolled: usize,
    /// Records queued for a seat.
    pub waitlist: usize,
    /// Cancelled records.
    pub cancelled: usize,
    /// Completed records.
    pub completed: usize,
}

impl StatusCounts {
    /// Tally one record.
    pub fn add(&mut self, status: EnrollmentStatus) {
        match status {
            EnrollmentStatus::Enrolled => self.enrolled += 1,
            EnrollmentStatus::Waitlist => self.waitlist += 1,
            EnrollmentStatus::Cancelled => self.cancelled += 1,
            EnrollmentStatus::Completed => self.completed += 1,
        }
    }
}

/// Caller input for a new enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEnrollment {
    /// Target class.
    pub class_id: ClassId,
    /// Enrolling member.
    pub member_id: MemberId,
    /// Ordering key override; defaults to now.
    pub enrollment_date: Option<DateTime<Utc>>,
    /// Requested status; defaults to enrolled and is downgraded when the class is full.
    pub requested_status: Option<EnrollmentStatus>,
}

impl NewEnrollment {
    /// Request a default enrollment.
    pub fn new(class_id: impl Into<ClassId>, member_id: impl Into<MemberId>) -> Self {
        Self {
            class_id: class_id.into(),
            member_id: member_id.into(),
            enrollment_date: None,
            requested_status: None,
        }
    }

    /// Pin the ordering key.
    #[must_use]
    pub const fn with_enrollment_date(mut self, date: DateTime<Utc>) -> Self {
        self.enrollment_date = Some(date);
        self
    }

    /// Ask for a specific starting status.
    #[must_use]
    pub const fn with_requested_status(mut self, status: EnrollmentStatus) -> Self {
        self.requested_status = Some(status);
        self
    }
}

/// Optional filters for listing enrollments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentFilter {
    /// Restrict to one class.
    pub class_id: Option<ClassId>,
    /// Restrict to one member.
    pub member_id: Option<MemberId>,
    /// Restrict to one status.
    pub status: Option<EnrollmentStatus>,
}

impl EnrollmentFilter {
    /// Whether `record` passes every set filter.
    pub fn matches(&self, record: &EnrollmentRecord) -> bool {
        self.class_id.as_ref().is_none_or(|c| *c == record.class_id)
            && self.member_id.as_ref().is_none_or(|m| *m == record.member_id)
            && self.status.is_none_or(|s| s == record.status)
    }
}

/// Page metadata returned with list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
    /// Total matching records.
    pub total: usize,
    /// Number of pages at this limit.
    pub total_pages: usize,
}

impl Pagination {
    /// Compute page metadata.
    pub const fn new(page: usize, limit: usize, total: usize) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Records to skip for this page.
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of enrollment records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentPage {
    /// Records on this page.
    pub records: Vec<EnrollmentRecord>,
    /// Page metadata.
    pub pagination: Pagination,
}
