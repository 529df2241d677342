//! Duplicate guard and capacity gate for new enrollments.
//!
//! Both checks read the store and must run inside the caller's per-class
//! critical section together with the insert that follows them.

use crate::core::{
    ClassCapacity, ClassId, EnrollmentError, EnrollmentStatus, EnrollmentStore, MemberId,
};

/// Reject a request when the member already holds an active record in the class.
///
/// # Errors
///
/// Returns [`EnrollmentError::Conflict`] naming the existing record.
pub fn check_duplicate<S>(
    store: &S,
    class_id: &ClassId,
    member_id: &MemberId,
) -> Result<(), EnrollmentError>
where
    S: EnrollmentStore,
{
    if let Some(existing) = store.find_active(class_id, member_id)? {
        tracing::warn!(
            "member {} already {} in class {} ({})",
            member_id,
            existing.status,
            class_id,
            existing.id
        );
        let state = match existing.status {
            EnrollmentStatus::Waitlist => "waitlisted",
            _ => "enrolled",
        };
        return Err(EnrollmentError::Conflict(format!(
            "member {member_id} is already {state} in class {class_id}"
        )));
    }
    Ok(())
}

/// Reject starting statuses that a new record can never hold.
///
/// # Errors
///
/// Returns [`EnrollmentError::InvalidRequest`] for terminal statuses.
pub fn validate_requested(requested: Option<EnrollmentStatus>) -> Result<(), EnrollmentError> {
    match requested {
        Some(status) if status.is_terminal() => Err(EnrollmentError::InvalidRequest(format!(
            "new enrollments cannot start as {status}"
        ))),
        _ => Ok(()),
    }
}

/// Decide the starting status of a new record from the current enrolled count.
///
/// A full class always waitlists. With a free seat the requested status is
/// honored, defaulting to enrolled. `requested` must already have passed
/// [`validate_requested`].
///
/// # Errors
///
/// Propagates store failures.
pub fn decide_status<S>(
    store: &S,
    class_id: &ClassId,
    capacity: ClassCapacity,
    requested: Option<EnrollmentStatus>,
) -> Result<EnrollmentStatus, EnrollmentError>
where
    S: EnrollmentStore,
{
    let enrolled = store.count_by_status(class_id, EnrollmentStatus::Enrolled)?;
    let status = if capacity.has_open_seat(enrolled) {
        requested.unwrap_or(EnrollmentStatus::Enrolled)
    } else {
        EnrollmentStatus::Waitlist
    };
    tracing::debug!(
        "class {} admission: enrolled={} capacity={:?} -> {}",
        class_id,
        enrolled,
        capacity.capacity,
        status
    );
    Ok(status)
}
