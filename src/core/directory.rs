//! Read-only lookups into the class catalogue and membership directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ClassId, EnrollmentError, MemberId};

/// Seat capacity of a class. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCapacity {
    /// Maximum enrolled members, if bounded.
    pub capacity: Option<u32>,
}

impl ClassCapacity {
    /// Bounded capacity.
    pub const fn limited(seats: u32) -> Self {
        Self {
            capacity: Some(seats),
        }
    }

    /// No seat limit.
    pub const fn unlimited() -> Self {
        Self { capacity: None }
    }

    /// Whether another member can be enrolled given `enrolled` current seats.
    pub fn has_open_seat(self, enrolled: usize) -> bool {
        self.capacity
            .is_none_or(|seats| enrolled < usize::try_from(seats).unwrap_or(usize::MAX))
    }

    /// Unfilled seats, or `None` when unlimited.
    pub fn available(self, enrolled: usize) -> Option<u32> {
        self.capacity.map(|seats| {
            let taken = u32::try_from(enrolled).unwrap_or(u32::MAX);
            seats.saturating_sub(taken)
        })
    }
}

/// Resolves a class to its current capacity.
#[async_trait]
pub trait ClassCapacityProvider: Send + Sync {
    /// Capacity of `class_id` at the moment of the call.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] if the class does not exist.
    async fn class_capacity(&self, class_id: &ClassId) -> Result<ClassCapacity, EnrollmentError>;
}

/// Confirms that a member exists.
#[async_trait]
pub trait MemberLookup: Send + Sync {
    /// Succeeds when `member_id` is a known member.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] if the member does not exist.
    async fn ensure_member(&self, member_id: &MemberId) -> Result<(), EnrollmentError>;
}
