//! In-memory class catalogue and member directory.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{
    ClassCapacity, ClassCapacityProvider, ClassId, EnrollmentError, EntityKind, MemberId,
    MemberLookup,
};

/// Directory backed by maps, for development and testing.
///
/// Capacities can be changed at any time; the enrollment service reads them
/// fresh at every admission and promotion decision.
#[derive(Default)]
pub struct InMemoryDirectory {
    classes: RwLock<HashMap<ClassId, ClassCapacity>>,
    members: RwLock<HashSet<MemberId>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or resize a class.
    pub fn upsert_class(&self, class_id: impl Into<ClassId>, capacity: ClassCapacity) {
        self.classes.write().insert(class_id.into(), capacity);
    }

    /// Remove a class; later lookups fail with not found.
    pub fn remove_class(&self, class_id: &ClassId) -> bool {
        self.classes.write().remove(class_id).is_some()
    }

    /// Register a member.
    pub fn add_member(&self, member_id: impl Into<MemberId>) {
        self.members.write().insert(member_id.into());
    }

    /// Register several members at once.
    pub fn add_members<I, M>(&self, members: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        let mut known = self.members.write();
        known.extend(members.into_iter().map(Into::into));
    }
}

#[async_trait]
impl ClassCapacityProvider for InMemoryDirectory {
    async fn class_capacity(&self, class_id: &ClassId) -> Result<ClassCapacity, EnrollmentError> {
        self.classes
            .read()
            .get(class_id)
            .copied()
            .ok_or_else(|| EnrollmentError::not_found(EntityKind::Class, class_id))
    }
}

#[async_trait]
impl MemberLookup for InMemoryDirectory {
    async fn ensure_member(&self, member_id: &MemberId) -> Result<(), EnrollmentError> {
        if self.members.read().contains(member_id) {
            Ok(())
        } else {
            Err(EnrollmentError::not_found(EntityKind::Member, member_id))
        }
    }
}
