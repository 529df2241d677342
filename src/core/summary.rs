//! Per-class aggregate view derived from the record store.

use serde::{Deserialize, Serialize};

use crate::core::{ClassCapacity, ClassId, StatusCounts};

/// Enrollment counts and open seats for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    /// Summarized class.
    pub class_id: ClassId,
    /// Seat limit, `None` when unlimited.
    pub capacity: Option<u32>,
    /// Records holding a seat.
    pub enrolled_count: usize,
    /// Records queued for a seat.
    pub waitlist_count: usize,
    /// Cancelled records.
    pub cancelled_count: usize,
    /// Completed records.
    pub completed_count: usize,
    /// `max(0, capacity - enrolled)`, `None` when unlimited.
    pub available_spots: Option<u32>,
}

impl ClassSummary {
    /// Project counts taken from one store snapshot.
    pub fn project(class_id: ClassId, capacity: ClassCapacity, counts: StatusCounts) -> Self {
        Self {
            class_id,
            capacity: capacity.capacity,
            enrolled_count: counts.enrolled,
            waitlist_count: counts.waitlist,
            cancelled_count: counts.cancelled,
            completed_count: counts.completed,
            available_spots: capacity.available(counts.enrolled),
        }
    }
}
