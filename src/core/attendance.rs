//! Attendance tracking against enrolled records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{EnrollmentError, EnrollmentId, EnrollmentRecord, EnrollmentStore};

/// Caller input for one attendance mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceMark {
    /// Whether the member showed up.
    pub attended: bool,
    /// Session date; defaults to now.
    pub date: Option<DateTime<Utc>>,
    /// Free-form note kept in the audit trail.
    pub notes: Option<String>,
}

impl AttendanceMark {
    /// Member attended.
    pub const fn attended() -> Self {
        Self {
            attended: true,
            date: None,
            notes: None,
        }
    }

    /// Member missed the session.
    pub const fn missed() -> Self {
        Self {
            attended: false,
            date: None,
            notes: None,
        }
    }
}

/// Acknowledgment of an attendance mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReceipt {
    /// Marked record.
    pub enrollment_id: EnrollmentId,
    /// Echo of the mark.
    pub attended: bool,
    /// Effective session date.
    pub date: DateTime<Utc>,
}

/// Check the record is enrolled and count the session in one store update.
///
/// # Errors
///
/// Returns [`EnrollmentError::NotFound`] for unknown ids and
/// [`EnrollmentError::InvalidState`] when the record is not enrolled.
pub fn mark<S>(
    store: &S,
    id: EnrollmentId,
    mark: &AttendanceMark,
    now: DateTime<Utc>,
) -> Result<(EnrollmentRecord, AttendanceReceipt), EnrollmentError>
where
    S: EnrollmentStore,
{
    let record = store.update(id, |record| record.record_attendance(mark.attended, now))?;
    let receipt = AttendanceReceipt {
        enrollment_id: id,
        attended: mark.attended,
        date: mark.date.unwrap_or(now),
    };
    Ok((record, receipt))
}
