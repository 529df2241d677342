//! Enrollment records, capacity admission, waitlist promotion, and the service
//! that runs them as per-class atomic units.

pub mod admission;
pub mod attendance;
pub mod audit;
pub mod directory;
pub mod enrollment;
pub mod error;
pub mod locks;
pub mod promotion;
pub mod service;
pub mod store;
pub mod summary;

pub use attendance::{AttendanceMark, AttendanceReceipt};
pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use directory::{ClassCapacity, ClassCapacityProvider, MemberLookup};
pub use enrollment::{
    ClassId, EnrollmentFilter, EnrollmentId, EnrollmentPage, EnrollmentRecord, EnrollmentStatus,
    MemberId, NewEnrollment, Pagination, StatusCounts,
};
pub use error::{AppResult, EnrollmentError, EntityKind};
pub use locks::{ClassGuard, ClassLockRegistry};
pub use service::{EnrollmentService, PageLimits, TransitionOutcome};
pub use store::EnrollmentStore;
pub use summary::ClassSummary;
