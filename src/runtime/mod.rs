//! Request/response surface consumed by an outer transport layer.

pub mod api;

pub use api::{
    cancel_enrollment, class_summary, create_enrollment, get_enrollment, list_enrollments,
    mark_attendance, update_status, ApiError, AttendanceRequest, CancelResponse,
    CreateEnrollmentRequest, ErrorKind, ListEnrollmentsQuery, UpdateStatusRequest,
};
