//! In-memory enrollment store with a per-class index.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::{
    ClassId, EnrollmentError, EnrollmentFilter, EnrollmentId, EnrollmentRecord, EnrollmentStatus,
    EnrollmentStore, EntityKind, MemberId, StatusCounts,
};

#[derive(Default)]
struct Tables {
    records: HashMap<EnrollmentId, EnrollmentRecord>,
    /// Record ids per class in insertion order.
    by_class: HashMap<ClassId, Vec<EnrollmentId>>,
    next_sequence: u64,
}

impl Tables {
    fn class_records<'a>(
        &'a self,
        class_id: &ClassId,
    ) -> impl Iterator<Item = &'a EnrollmentRecord> + 'a {
        self.by_class
            .get(class_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.records.get(id))
    }
}

/// In-memory store for development and testing.
///
/// A single `RwLock` covers both the records and the class index so every
/// call sees one consistent snapshot.
#[derive(Default)]
pub struct InMemoryEnrollmentStore {
    tables: RwLock<Tables>,
}

impl InMemoryEnrollmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored records, any status.
    pub fn len(&self) -> usize {
        self.tables.read().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.tables.read().records.is_empty()
    }
}

impl EnrollmentStore for InMemoryEnrollmentStore {
    fn insert(&self, mut record: EnrollmentRecord) -> Result<EnrollmentRecord, EnrollmentError> {
        let mut tables = self.tables.write();
        if tables.records.contains_key(&record.id) {
            return Err(EnrollmentError::Backend(format!(
                "duplicate enrollment id {}",
                record.id
            )));
        }
        tables.next_sequence += 1;
        record.sequence = tables.next_sequence;
        tables
            .by_class
            .entry(record.class_id.clone())
            .or_default()
            .push(record.id);
        tables.records.insert(record.id, record.clone());
        tracing::debug!(
            "stored enrollment {} seq={} status={}",
            record.id,
            record.sequence,
            record.status
        );
        Ok(record)
    }

    fn get(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        Ok(self.tables.read().records.get(&id).cloned())
    }

    fn update_all<F>(
        &self,
        ids: &[EnrollmentId],
        mutate: F,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentError>
    where
        F: FnOnce(&mut [EnrollmentRecord]) -> Result<(), EnrollmentError>,
    {
        let mut tables = self.tables.write();
        let mut drafts = ids
            .iter()
            .map(|id| {
                tables
                    .records
                    .get(id)
                    .cloned()
                    .ok_or_else(|| EnrollmentError::not_found(EntityKind::Enrollment, id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        mutate(&mut drafts)?;
        for draft in &drafts {
            tables.records.insert(draft.id, draft.clone());
        }
        Ok(drafts)
    }

    fn find_active(
        &self,
        class_id: &ClassId,
        member_id: &MemberId,
    ) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        let tables = self.tables.read();
        let found = tables
            .class_records(class_id)
            .find(|r| r.member_id == *member_id && r.status.is_active())
            .cloned();
        Ok(found)
    }

    fn count_by_status(
        &self,
        class_id: &ClassId,
        status: EnrollmentStatus,
    ) -> Result<usize, EnrollmentError> {
        let tables = self.tables.read();
        Ok(tables
            .class_records(class_id)
            .filter(|r| r.status == status)
            .count())
    }

    fn status_counts(&self, class_id: &ClassId) -> Result<StatusCounts, EnrollmentError> {
        let tables = self.tables.read();
        let mut counts = StatusCounts::default();
        for record in tables.class_records(class_id) {
            counts.add(record.status);
        }
        Ok(counts)
    }

    fn waitlist(&self, class_id: &ClassId) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        let tables = self.tables.read();
        let mut waiting: Vec<EnrollmentRecord> = tables
            .class_records(class_id)
            .filter(|r| r.status == EnrollmentStatus::Waitlist)
            .cloned()
            .collect();
        waiting.sort_by_key(EnrollmentRecord::queue_key);
        Ok(waiting)
    }

    fn waitlist_head(&self, class_id: &ClassId) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        let tables = self.tables.read();
        Ok(tables
            .class_records(class_id)
            .filter(|r| r.status == EnrollmentStatus::Waitlist)
            .min_by_key(|r| r.queue_key())
            .cloned())
    }

    fn list(
        &self,
        filter: &EnrollmentFilter,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<EnrollmentRecord>, usize), EnrollmentError> {
        let tables = self.tables.read();
        let mut matched: Vec<&EnrollmentRecord> = match &filter.class_id {
            Some(class_id) => tables
                .class_records(class_id)
                .filter(|r| filter.matches(r))
                .collect(),
            None => tables.records.values().filter(|r| filter.matches(r)).collect(),
        };
        matched.sort_by_key(|r| r.queue_key());
        let total = matched.len();
        let page = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((page, total))
    }
}
