//! API-facing request/response models and handlers.
//!
//! Handlers take deserialized requests, call the service, and map domain
//! errors to a serializable [`ApiError`]. Routing and status-code mapping
//! belong to the transport layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{
    AttendanceMark, AttendanceReceipt, ClassId, ClassSummary, EnrollmentError, EnrollmentFilter,
    EnrollmentId, EnrollmentPage, EnrollmentRecord, EnrollmentService, EnrollmentStatus,
    EnrollmentStore, MemberId, NewEnrollment, TransitionOutcome,
};

/// Enrollment creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    /// Target class.
    pub class_id: ClassId,
    /// Enrolling member.
    pub member_id: MemberId,
    /// Optional ordering key.
    #[serde(default)]
    pub enrollment_date: Option<DateTime<Utc>>,
    /// Optional starting status.
    #[serde(default)]
    pub status: Option<EnrollmentStatus>,
}

impl From<CreateEnrollmentRequest> for NewEnrollment {
    fn from(req: CreateEnrollmentRequest) -> Self {
        Self {
            class_id: req.class_id,
            member_id: req.member_id,
            enrollment_date: req.enrollment_date,
            requested_status: req.status,
        }
    }
}

/// Attendance payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    /// Whether the member showed up.
    pub attended: bool,
    /// Optional session date.
    #[serde(default)]
    pub attendance_date: Option<DateTime<Utc>>,
    /// Optional note.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Manual status change payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    /// Desired status.
    pub status: EnrollmentStatus,
}

/// List query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListEnrollmentsQuery {
    /// Restrict to one class.
    pub class_id: Option<ClassId>,
    /// Restrict to one member.
    pub member_id: Option<MemberId>,
    /// Restrict to one status.
    pub status: Option<EnrollmentStatus>,
    /// 1-based page.
    pub page: Option<usize>,
    /// Page size.
    pub limit: Option<usize>,
}

/// Cancellation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    /// Human-readable result.
    pub message: String,
    /// Record promoted into the freed seat, if any.
    pub promoted_enrollment_id: Option<EnrollmentId>,
}

impl From<TransitionOutcome> for CancelResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            message: outcome.message,
            promoted_enrollment_id: outcome.promoted.map(|r| r.id),
        }
    }
}

/// Error categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing class, member, or enrollment.
    NotFound,
    /// Duplicate active enrollment or full class.
    Conflict,
    /// Operation not allowed in the current status.
    InvalidState,
    /// Malformed request.
    InvalidRequest,
    /// Transient contention; safe to retry later.
    Busy,
    /// Unexpected failure.
    Internal,
}

/// Serializable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Category.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        let kind = match &err {
            EnrollmentError::NotFound { .. } => ErrorKind::NotFound,
            EnrollmentError::Conflict(_) => ErrorKind::Conflict,
            EnrollmentError::InvalidState { .. } => ErrorKind::InvalidState,
            EnrollmentError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            EnrollmentError::Concurrency(_) => ErrorKind::Busy,
            EnrollmentError::Backend(_) => ErrorKind::Internal,
        };
        if kind == ErrorKind::Internal {
            tracing::error!("enrollment request failed: {}", err);
        }
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Create an enrollment.
pub async fn create_enrollment<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    req: CreateEnrollmentRequest,
) -> Result<EnrollmentRecord, ApiError> {
    Ok(service.create_enrollment(req.into()).await?)
}

/// Cancel an enrollment.
pub async fn cancel_enrollment<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    id: EnrollmentId,
) -> Result<CancelResponse, ApiError> {
    Ok(service.cancel_enrollment(id).await?.into())
}

/// Mark attendance.
pub async fn mark_attendance<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    id: EnrollmentId,
    req: AttendanceRequest,
) -> Result<AttendanceReceipt, ApiError> {
    let mark = AttendanceMark {
        attended: req.attended,
        date: req.attendance_date,
        notes: req.notes,
    };
    Ok(service.mark_attendance(id, mark).await?)
}

/// Fetch one enrollment.
pub async fn get_enrollment<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    id: EnrollmentId,
) -> Result<EnrollmentRecord, ApiError> {
    Ok(service.get_enrollment(id).await?)
}

/// Apply a manual status change.
pub async fn update_status<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    id: EnrollmentId,
    req: UpdateStatusRequest,
) -> Result<EnrollmentRecord, ApiError> {
    Ok(service.update_status(id, req.status).await?.enrollment)
}

/// List enrollments.
pub async fn list_enrollments<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    query: ListEnrollmentsQuery,
) -> Result<EnrollmentPage, ApiError> {
    let filter = EnrollmentFilter {
        class_id: query.class_id,
        member_id: query.member_id,
        status: query.status,
    };
    Ok(service
        .list_enrollments(&filter, query.page, query.limit)
        .await?)
}

/// Summarize a class.
pub async fn class_summary<S: EnrollmentStore>(
    service: &EnrollmentService<S>,
    class_id: &ClassId,
) -> Result<ClassSummary, ApiError> {
    Ok(service.class_summary(class_id).await?)
}
