//! Enrollment service: admission, release with promotion, attendance, and
//! read-side queries over a shared record store.
//!
//! Concurrency model:
//!
//! - Admission (duplicate guard, capacity gate, insert) and release
//!   (cancel/complete plus waitlist promotion) run under the per-class lock
//!   from [`ClassLockRegistry`], so enrolled counts read inside the unit are
//!   never stale at write time. A release writes the released record and the
//!   promoted one in a single all-or-nothing store call.
//! - Attendance runs as one store read-modify-write on the record and needs
//!   no class lock; it never changes status.
//! - Lock timeouts surface as [`EnrollmentError::Concurrency`] and are
//!   retried under the configured [`RetryPolicy`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EnrollmentConfig;
use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::{
    admission, attendance, promotion, AttendanceMark, AttendanceReceipt, ClassCapacityProvider,
    ClassId, ClassLockRegistry, ClassSummary, EnrollmentError, EnrollmentFilter, EnrollmentId,
    EnrollmentPage, EnrollmentRecord, EnrollmentStatus, EnrollmentStore, EntityKind, MemberLookup,
    NewEnrollment, Pagination,
};
use crate::util::clock::Clock;
use crate::util::retry::{retry_transient, RetryPolicy};

/// Result of a cancel, complete, or manual promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    /// Human-readable summary for the caller.
    pub message: String,
    /// The record after the transition.
    pub enrollment: EnrollmentRecord,
    /// Waitlisted record moved into the freed seat, if any.
    pub promoted: Option<EnrollmentRecord>,
}

/// Page size policy applied to list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Used when the caller gives no limit.
    pub default_limit: usize,
    /// Larger requested limits are clamped to this.
    pub max_limit: usize,
}

impl PageLimits {
    /// Normalize a caller's page and limit into page metadata for `total` rows.
    pub fn paginate(&self, page: Option<usize>, limit: Option<usize>, total: usize) -> Pagination {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1));
        Pagination::new(page, limit, total)
    }
}

/// Capacity-managed enrollment over store `S`.
pub struct EnrollmentService<S> {
    store: Arc<S>,
    classes: Arc<dyn ClassCapacityProvider>,
    members: Arc<dyn MemberLookup>,
    locks: ClassLockRegistry,
    retry: RetryPolicy,
    pages: PageLimits,
    clock: Arc<dyn Clock>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<S> EnrollmentService<S>
where
    S: EnrollmentStore,
{
    /// Create a service from its collaborators.
    pub fn new(
        config: &EnrollmentConfig,
        store: Arc<S>,
        classes: Arc<dyn ClassCapacityProvider>,
        members: Arc<dyn MemberLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            classes,
            members,
            locks: ClassLockRegistry::new(config.lock_timeout()),
            retry: config.retry_policy(),
            pages: config.page_limits(),
            clock,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Shared record store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Per-class lock registry, e.g. for pruning idle entries.
    pub const fn locks(&self) -> &ClassLockRegistry {
        &self.locks
    }

    /// Admit a member into a class as enrolled or waitlisted.
    ///
    /// # Errors
    ///
    /// - [`EnrollmentError::NotFound`] for an unknown class or member.
    /// - [`EnrollmentError::Conflict`] if the member already has an active record.
    /// - [`EnrollmentError::InvalidRequest`] for a terminal requested status.
    /// - [`EnrollmentError::Concurrency`] once retries are exhausted.
    pub async fn create_enrollment(
        &self,
        request: NewEnrollment,
    ) -> Result<EnrollmentRecord, EnrollmentError> {
        admission::validate_requested(request.requested_status)?;
        self.members.ensure_member(&request.member_id).await?;
        let request = &request;
        retry_transient(&self.retry, "create_enrollment", move || self.admit(request)).await
    }

    async fn admit(&self, request: &NewEnrollment) -> Result<EnrollmentRecord, EnrollmentError> {
        // Unknown classes fail here and never get a lock entry.
        self.classes.class_capacity(&request.class_id).await?;
        let _guard = self.locks.acquire(&request.class_id).await?;
        let capacity = self.classes.class_capacity(&request.class_id).await?;

        admission::check_duplicate(&*self.store, &request.class_id, &request.member_id)?;
        let status = admission::decide_status(
            &*self.store,
            &request.class_id,
            capacity,
            request.requested_status,
        )?;

        let now = self.clock.now();
        let record = self.store.insert(EnrollmentRecord::new(
            request.class_id.clone(),
            request.member_id.clone(),
            request.enrollment_date.unwrap_or(now),
            status,
            now,
        ))?;

        tracing::info!(
            "member {} {} in class {} as {}",
            record.member_id,
            if status == EnrollmentStatus::Enrolled {
                "admitted"
            } else {
                "queued"
            },
            record.class_id,
            record.id
        );
        let action = match status {
            EnrollmentStatus::Enrolled => AuditAction::Admit,
            _ => AuditAction::Waitlist,
        };
        self.audit(&record, action, now, None);
        Ok(record)
    }

    /// Cancel an enrollment, promoting the waitlist head if a seat was freed.
    ///
    /// Cancelling an already cancelled record succeeds without side effects.
    ///
    /// # Errors
    ///
    /// - [`EnrollmentError::NotFound`] for an unknown enrollment.
    /// - [`EnrollmentError::InvalidState`] for a completed record.
    /// - [`EnrollmentError::Concurrency`] once retries are exhausted.
    pub async fn cancel_enrollment(
        &self,
        id: EnrollmentId,
    ) -> Result<TransitionOutcome, EnrollmentError> {
        retry_transient(&self.retry, "cancel_enrollment", move || {
            self.release(id, EnrollmentStatus::Cancelled)
        })
        .await
    }

    /// Mark an enrolled record completed and promote into the freed seat.
    ///
    /// # Errors
    ///
    /// - [`EnrollmentError::NotFound`] for an unknown enrollment.
    /// - [`EnrollmentError::InvalidState`] unless the record is enrolled.
    /// - [`EnrollmentError::Concurrency`] once retries are exhausted.
    pub async fn complete_enrollment(
        &self,
        id: EnrollmentId,
    ) -> Result<TransitionOutcome, EnrollmentError> {
        retry_transient(&self.retry, "complete_enrollment", move || {
            self.release(id, EnrollmentStatus::Completed)
        })
        .await
    }

    /// Cancel several enrollments. Each one is its own atomic unit with its
    /// own promotion attempt; one failure does not stop the rest.
    pub async fn cancel_enrollments(
        &self,
        ids: &[EnrollmentId],
    ) -> Vec<(EnrollmentId, Result<TransitionOutcome, EnrollmentError>)> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            outcomes.push((id, self.cancel_enrollment(id).await));
        }
        outcomes
    }

    /// Manual status change. Terminal targets go through cancel/complete;
    /// `enrolled` promotes a waitlisted record only if it is the head of the
    /// class waitlist and a seat is free. Every other change is rejected.
    ///
    /// # Errors
    ///
    /// - [`EnrollmentError::NotFound`] for an unknown enrollment.
    /// - [`EnrollmentError::InvalidState`] for a disallowed transition.
    /// - [`EnrollmentError::Conflict`] when promoting into a full class or
    ///   past an earlier waitlisted record.
    pub async fn update_status(
        &self,
        id: EnrollmentId,
        target: EnrollmentStatus,
    ) -> Result<TransitionOutcome, EnrollmentError> {
        match target {
            EnrollmentStatus::Cancelled => self.cancel_enrollment(id).await,
            EnrollmentStatus::Completed => self.complete_enrollment(id).await,
            EnrollmentStatus::Enrolled => {
                retry_transient(&self.retry, "promote_enrollment", move || {
                    self.promote_specific(id)
                })
                .await
            }
            EnrollmentStatus::Waitlist => {
                let record = self.get_enrollment(id).await?;
                Err(EnrollmentError::invalid_state(id, record.status, "waitlist"))
            }
        }
    }

    async fn release(
        &self,
        id: EnrollmentId,
        target: EnrollmentStatus,
    ) -> Result<TransitionOutcome, EnrollmentError> {
        let class_id = self.require(id)?.class_id;
        let _guard = self.locks.acquire(&class_id).await?;

        // Re-read under the lock: a concurrent unit may have moved it.
        let current = self.require(id)?;
        if target == EnrollmentStatus::Cancelled && current.status == EnrollmentStatus::Cancelled {
            tracing::debug!("enrollment {} already cancelled", id);
            return Ok(TransitionOutcome {
                message: "Enrollment already cancelled".into(),
                enrollment: current,
                promoted: None,
            });
        }

        // Resolve capacity before writing so a lookup failure leaves no partial change.
        let capacity = if current.status == EnrollmentStatus::Enrolled {
            Some(self.classes.class_capacity(&class_id).await?)
        } else {
            None
        };

        let now = self.clock.now();
        let (enrollment, promoted) =
            promotion::release(&*self.store, &current, target, capacity, now)?;
        let action = if target == EnrollmentStatus::Completed {
            AuditAction::Complete
        } else {
            AuditAction::Cancel
        };
        self.audit(&enrollment, action, now, None);
        tracing::info!("enrollment {} in class {} -> {}", id, class_id, target);
        if let Some(record) = &promoted {
            self.audit(record, AuditAction::Promote, now, Some(format!("seat freed by {id}")));
        }

        let message = match target {
            EnrollmentStatus::Completed => "Enrollment completed successfully",
            _ => "Enrollment cancelled successfully",
        };
        Ok(TransitionOutcome {
            message: message.into(),
            enrollment,
            promoted,
        })
    }

    async fn promote_specific(&self, id: EnrollmentId) -> Result<TransitionOutcome, EnrollmentError> {
        let class_id = self.require(id)?.class_id;
        let _guard = self.locks.acquire(&class_id).await?;

        let current = self.require(id)?;
        if current.status != EnrollmentStatus::Waitlist {
            return Err(EnrollmentError::invalid_state(id, current.status, "enroll"));
        }
        let capacity = self.classes.class_capacity(&class_id).await?;
        let now = self.clock.now();
        let enrollment = promotion::promote_waiting(&*self.store, &current, capacity, now)?;
        self.audit(&enrollment, AuditAction::Promote, now, Some("manual".into()));
        Ok(TransitionOutcome {
            message: "Enrollment promoted from waitlist".into(),
            enrollment,
            promoted: None,
        })
    }

    /// Record attendance for an enrolled member.
    ///
    /// # Errors
    ///
    /// - [`EnrollmentError::NotFound`] for an unknown enrollment.
    /// - [`EnrollmentError::InvalidState`] unless the record is enrolled.
    pub async fn mark_attendance(
        &self,
        id: EnrollmentId,
        mark: AttendanceMark,
    ) -> Result<AttendanceReceipt, EnrollmentError> {
        let now = self.clock.now();
        let (record, receipt) = attendance::mark(&*self.store, id, &mark, now)?;
        let action = if mark.attended {
            AuditAction::Attend
        } else {
            AuditAction::Miss
        };
        self.audit(&record, action, receipt.date, mark.notes);
        tracing::debug!(
            "attendance for {}: attended={} total={}",
            id,
            receipt.attended,
            record.attendance_count
        );
        Ok(receipt)
    }

    /// Fetch one enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] for an unknown enrollment.
    pub async fn get_enrollment(&self, id: EnrollmentId) -> Result<EnrollmentRecord, EnrollmentError> {
        self.require(id)
    }

    /// List enrollments matching `filter`, ordered by enrollment date.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn list_enrollments(
        &self,
        filter: &EnrollmentFilter,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<EnrollmentPage, EnrollmentError> {
        let window = self.pages.paginate(page, limit, 0);
        let (records, total) = self.store.list(filter, window.offset(), window.limit)?;
        Ok(EnrollmentPage {
            records,
            pagination: Pagination::new(window.page, window.limit, total),
        })
    }

    /// Aggregate counts and open seats for a class.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] for an unknown class.
    pub async fn class_summary(&self, class_id: &ClassId) -> Result<ClassSummary, EnrollmentError> {
        let capacity = self.classes.class_capacity(class_id).await?;
        let counts = self.store.status_counts(class_id)?;
        Ok(ClassSummary::project(class_id.clone(), capacity, counts))
    }

    /// 1-based position of a waitlisted record in its class queue.
    /// `None` when the record is not waitlisted.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] for an unknown enrollment.
    pub async fn waitlist_position(&self, id: EnrollmentId) -> Result<Option<usize>, EnrollmentError> {
        let record = self.require(id)?;
        if record.status != EnrollmentStatus::Waitlist {
            return Ok(None);
        }
        let queue = self.store.waitlist(&record.class_id)?;
        Ok(queue.iter().position(|r| r.id == id).map(|index| index + 1))
    }

    fn require(&self, id: EnrollmentId) -> Result<EnrollmentRecord, EnrollmentError> {
        self.store
            .get(id)?
            .ok_or_else(|| EnrollmentError::not_found(EntityKind::Enrollment, id))
    }

    fn audit(
        &self,
        record: &EnrollmentRecord,
        action: AuditAction,
        at: DateTime<Utc>,
        notes: Option<String>,
    ) {
        if let Some(sink) = &self.audit {
            sink.record(build_audit_event(record, action, at, notes));
        }
    }
}
