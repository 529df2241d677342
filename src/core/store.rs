//! Enrollment record store abstraction.

use crate::core::{
    ClassId, EnrollmentError, EnrollmentFilter, EnrollmentId, EnrollmentRecord, EnrollmentStatus,
    EntityKind, MemberId, StatusCounts,
};

/// Abstraction for enrollment record backends.
///
/// Every method is a single consistent read or write. Units that change
/// several records (cancel-and-promote) write them through one
/// [`update_all`](Self::update_all) call, which must apply every change or
/// none. The service serializes units per class, so reads made before that
/// write stay valid until it lands.
pub trait EnrollmentStore: Send + Sync {
    /// Persist a new record, assigning its insertion `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] if the id is already taken or the
    /// backend fails.
    fn insert(&self, record: EnrollmentRecord) -> Result<EnrollmentRecord, EnrollmentError>;

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] on backend failure.
    fn get(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, EnrollmentError>;

    /// Apply `mutate` to the records `ids`, passed in the same order, as one
    /// unit. Nothing is written unless every id exists and `mutate`
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] for an unknown id, whatever
    /// `mutate` returns, or [`EnrollmentError::Backend`] if the write fails.
    fn update_all<F>(
        &self,
        ids: &[EnrollmentId],
        mutate: F,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentError>
    where
        F: FnOnce(&mut [EnrollmentRecord]) -> Result<(), EnrollmentError>;

    /// Apply `mutate` to a record as one read-modify-write. Nothing is
    /// written when `mutate` fails.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] for an unknown id, or whatever
    /// `mutate` returns.
    fn update<F>(&self, id: EnrollmentId, mutate: F) -> Result<EnrollmentRecord, EnrollmentError>
    where
        F: FnOnce(&mut EnrollmentRecord) -> Result<(), EnrollmentError>,
    {
        let mut updated = self.update_all(&[id], |records| {
            let count = records.len();
            match records {
                [record] => mutate(record),
                _ => Err(EnrollmentError::Backend(format!(
                    "expected one record for {id}, got {count}"
                ))),
            }
        })?;
        updated
            .pop()
            .ok_or_else(|| EnrollmentError::not_found(EntityKind::Enrollment, id))
    }

    /// Active (enrolled or waitlisted) record for a member in a class.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] on backend failure.
    fn find_active(
        &self,
        class_id: &ClassId,
        member_id: &MemberId,
    ) -> Result<Option<EnrollmentRecord>, EnrollmentError>;

    /// Number of records of a class in `status`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] on backend failure.
    fn count_by_status(
        &self,
        class_id: &ClassId,
        status: EnrollmentStatus,
    ) -> Result<usize, EnrollmentError>;

    /// All per-status counts of a class from one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] on backend failure.
    fn status_counts(&self, class_id: &ClassId) -> Result<StatusCounts, EnrollmentError>;

    /// Waitlisted records of a class, earliest first.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] on backend failure.
    fn waitlist(&self, class_id: &ClassId) -> Result<Vec<EnrollmentRecord>, EnrollmentError>;

    /// Earliest waitlisted record of a class.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] on backend failure.
    fn waitlist_head(&self, class_id: &ClassId) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        Ok(self.waitlist(class_id)?.into_iter().next())
    }

    /// Records matching `filter` ordered by enrollment date, plus the total
    /// match count before `offset`/`limit` are applied.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Backend`] on backend failure.
    fn list(
        &self,
        filter: &EnrollmentFilter,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<EnrollmentRecord>, usize), EnrollmentError>;
}
