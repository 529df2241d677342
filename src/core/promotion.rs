//! Waitlist promotion: filling released seats and manual moves off the
//! waitlist. Both only ever hand a seat to the head of the class queue.

use chrono::{DateTime, Utc};

use crate::core::{
    ClassCapacity, ClassId, EnrollmentError, EnrollmentRecord, EnrollmentStatus, EnrollmentStore,
    EntityKind,
};

/// Earliest waitlisted record of `class_id` if a seat is open at `enrolled`.
///
/// Returns `None` when the waitlist is empty or the class is still full
/// (e.g. capacity was lowered at the provider).
///
/// # Errors
///
/// Propagates store failures.
pub fn next_in_line<S>(
    store: &S,
    class_id: &ClassId,
    capacity: ClassCapacity,
    enrolled: usize,
) -> Result<Option<EnrollmentRecord>, EnrollmentError>
where
    S: EnrollmentStore,
{
    if !capacity.has_open_seat(enrolled) {
        tracing::debug!(
            "class {} still full (enrolled={}), no promotion",
            class_id,
            enrolled
        );
        return Ok(None);
    }
    let head = store.waitlist_head(class_id)?;
    if head.is_none() {
        tracing::debug!("class {} waitlist empty, seat stays open", class_id);
    }
    Ok(head)
}

/// Move `current` to the terminal `target` and, when that frees a seat, the
/// waitlist head into it, as a single store write.
///
/// `capacity` is only consulted when `current` holds a seat; pass `None`
/// otherwise. Every read happens before the write, so a failure at any step
/// leaves both records as they were. Must run in the class's critical
/// section.
///
/// # Errors
///
/// Returns [`EnrollmentError::InvalidState`] for an illegal transition and
/// propagates store failures.
pub fn release<S>(
    store: &S,
    current: &EnrollmentRecord,
    target: EnrollmentStatus,
    capacity: Option<ClassCapacity>,
    now: DateTime<Utc>,
) -> Result<(EnrollmentRecord, Option<EnrollmentRecord>), EnrollmentError>
where
    S: EnrollmentStore,
{
    let head = match capacity {
        Some(capacity) if current.status == EnrollmentStatus::Enrolled => {
            let enrolled = store.count_by_status(&current.class_id, EnrollmentStatus::Enrolled)?;
            // `current` still counts as enrolled until the write below.
            next_in_line(store, &current.class_id, capacity, enrolled.saturating_sub(1))?
        }
        _ => None,
    };

    let mut ids = vec![current.id];
    ids.extend(head.as_ref().map(|record| record.id));
    let mut written = store.update_all(&ids, |records| {
        for (record, status) in records
            .iter_mut()
            .zip([target, EnrollmentStatus::Enrolled])
        {
            record.transition(status, now)?;
        }
        Ok(())
    })?;

    let promoted = if head.is_some() { written.pop() } else { None };
    let released = written
        .pop()
        .ok_or_else(|| EnrollmentError::not_found(EntityKind::Enrollment, current.id))?;
    if let Some(record) = &promoted {
        tracing::info!(
            "promoted enrollment {} (member {}) in class {}",
            record.id,
            record.member_id,
            record.class_id
        );
    }
    Ok((released, promoted))
}

/// Promote a specific waitlisted record on request.
///
/// Only the head of the class waitlist may be promoted, and only into an
/// open seat, so a manual move never jumps the queue. Must run in the
/// class's critical section.
///
/// # Errors
///
/// - [`EnrollmentError::InvalidState`] unless `current` is waitlisted.
/// - [`EnrollmentError::Conflict`] when the class is full or an earlier
///   record is waiting.
pub fn promote_waiting<S>(
    store: &S,
    current: &EnrollmentRecord,
    capacity: ClassCapacity,
    now: DateTime<Utc>,
) -> Result<EnrollmentRecord, EnrollmentError>
where
    S: EnrollmentStore,
{
    if current.status != EnrollmentStatus::Waitlist {
        return Err(EnrollmentError::invalid_state(
            current.id,
            current.status,
            "enroll",
        ));
    }
    let class_id = &current.class_id;
    let enrolled = store.count_by_status(class_id, EnrollmentStatus::Enrolled)?;
    let Some(head) = next_in_line(store, class_id, capacity, enrolled)? else {
        return Err(EnrollmentError::Conflict(format!(
            "class {class_id} has no open seat"
        )));
    };
    if head.id != current.id {
        return Err(EnrollmentError::Conflict(format!(
            "enrollment {} is waiting behind {} in class {class_id}",
            current.id, head.id
        )));
    }

    let promoted = store.update(current.id, |record| {
        record.transition(EnrollmentStatus::Enrolled, now)
    })?;
    tracing::info!(
        "enrollment {} manually promoted in class {}",
        promoted.id,
        class_id
    );
    Ok(promoted)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::infra::store::InMemoryEnrollmentStore;

    fn seed(
        store: &InMemoryEnrollmentStore,
        member: &str,
        status: EnrollmentStatus,
        date: DateTime<Utc>,
    ) -> EnrollmentRecord {
        store
            .insert(EnrollmentRecord::new("hiit".into(), member.into(), date, status, date))
            .unwrap()
    }

    fn status(store: &InMemoryEnrollmentStore, record: &EnrollmentRecord) -> EnrollmentStatus {
        store.get(record.id).unwrap().unwrap().status
    }

    #[test]
    fn test_release_promotes_earliest_waitlisted() {
        let store = InMemoryEnrollmentStore::new();
        let t0 = Utc::now();
        let seat = seed(&store, "seat", EnrollmentStatus::Enrolled, t0);
        let late = seed(&store, "late", EnrollmentStatus::Waitlist, t0 + Duration::minutes(5));
        let early = seed(&store, "early", EnrollmentStatus::Waitlist, t0);

        let (released, promoted) = release(
            &store,
            &seat,
            EnrollmentStatus::Cancelled,
            Some(ClassCapacity::limited(1)),
            t0,
        )
        .unwrap();
        assert_eq!(released.status, EnrollmentStatus::Cancelled);
        assert_eq!(promoted.unwrap().id, early.id);
        assert_eq!(status(&store, &late), EnrollmentStatus::Waitlist);
    }

    #[test]
    fn test_equal_dates_fall_back_to_insertion_order() {
        let store = InMemoryEnrollmentStore::new();
        let t0 = Utc::now();
        let first = seed(&store, "a", EnrollmentStatus::Waitlist, t0);
        seed(&store, "b", EnrollmentStatus::Waitlist, t0);

        let head = next_in_line(&store, &"hiit".into(), ClassCapacity::unlimited(), 0)
            .unwrap()
            .unwrap();
        assert_eq!(head.id, first.id);
    }

    #[test]
    fn test_no_promotion_when_still_full() {
        let store = InMemoryEnrollmentStore::new();
        let t0 = Utc::now();
        let a = seed(&store, "a", EnrollmentStatus::Enrolled, t0);
        seed(&store, "b", EnrollmentStatus::Enrolled, t0);
        let c = seed(&store, "c", EnrollmentStatus::Waitlist, t0);

        // Capacity was lowered to 1 while two hold seats.
        let (_, promoted) = release(
            &store,
            &a,
            EnrollmentStatus::Cancelled,
            Some(ClassCapacity::limited(1)),
            t0,
        )
        .unwrap();
        assert!(promoted.is_none());
        assert_eq!(status(&store, &c), EnrollmentStatus::Waitlist);
    }

    #[test]
    fn test_releasing_waitlisted_record_promotes_nobody() {
        let store = InMemoryEnrollmentStore::new();
        let t0 = Utc::now();
        let w1 = seed(&store, "w1", EnrollmentStatus::Waitlist, t0);
        let w2 = seed(&store, "w2", EnrollmentStatus::Waitlist, t0);

        let (released, promoted) =
            release(&store, &w1, EnrollmentStatus::Cancelled, None, t0).unwrap();
        assert_eq!(released.status, EnrollmentStatus::Cancelled);
        assert!(promoted.is_none());
        assert_eq!(status(&store, &w2), EnrollmentStatus::Waitlist);
    }

    #[test]
    fn test_illegal_release_writes_nothing() {
        let store = InMemoryEnrollmentStore::new();
        let t0 = Utc::now();
        let waiting = seed(&store, "w", EnrollmentStatus::Waitlist, t0);

        let err = release(&store, &waiting, EnrollmentStatus::Completed, None, t0).unwrap_err();
        assert!(matches!(err, EnrollmentError::InvalidState { .. }));
        assert_eq!(status(&store, &waiting), EnrollmentStatus::Waitlist);
    }

    #[test]
    fn test_manual_promotion_only_takes_head() {
        let store = InMemoryEnrollmentStore::new();
        let t0 = Utc::now();
        let w1 = seed(&store, "w1", EnrollmentStatus::Waitlist, t0);
        let w2 = seed(&store, "w2", EnrollmentStatus::Waitlist, t0 + Duration::minutes(1));

        let err = promote_waiting(&store, &w2, ClassCapacity::limited(1), t0).unwrap_err();
        assert!(matches!(err, EnrollmentError::Conflict(msg) if msg.contains("behind")));
        assert_eq!(status(&store, &w2), EnrollmentStatus::Waitlist);

        let promoted = promote_waiting(&store, &w1, ClassCapacity::limited(1), t0).unwrap();
        assert_eq!(promoted.status, EnrollmentStatus::Enrolled);

        let err = promote_waiting(&store, &w2, ClassCapacity::limited(1), t0).unwrap_err();
        assert!(matches!(err, EnrollmentError::Conflict(msg) if msg.contains("no open seat")));
    }

    #[test]
    fn test_manual_promotion_rejects_non_waitlisted() {
        let store = InMemoryEnrollmentStore::new();
        let seat = seed(&store, "seat", EnrollmentStatus::Enrolled, Utc::now());
        let err =
            promote_waiting(&store, &seat, ClassCapacity::unlimited(), Utc::now()).unwrap_err();
        assert!(matches!(err, EnrollmentError::InvalidState { .. }));
    }
}
