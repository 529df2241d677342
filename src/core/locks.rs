//! Per-class critical sections.
//!
//! Admission and cancel-and-promote units for one class are serialized
//! behind an async mutex keyed by class id; unrelated classes never contend.
//! The registry map itself is guarded by a `parking_lot::Mutex` that is only
//! held long enough to clone or drop the per-class `Arc`.
//!
//! An entry lives only while someone holds or waits on it: the last guard
//! or timed-out waiter to leave removes it, so the map is bounded by the
//! number of classes with work in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::core::{ClassId, EnrollmentError};

type LockMap = HashMap<ClassId, Arc<AsyncMutex<()>>>;

/// Held for the duration of one per-class atomic unit.
pub struct ClassGuard {
    class_id: ClassId,
    locks: Arc<Mutex<LockMap>>,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ClassGuard {
    /// Class this guard serializes.
    pub const fn class_id(&self) -> &ClassId {
        &self.class_id
    }
}

impl Drop for ClassGuard {
    fn drop(&mut self) {
        // Unlock first so a waiter never overlaps with this unit.
        drop(self.guard.take());
        release_entry(&self.locks, &self.class_id, &self.lock);
        tracing::trace!("released lock for class {}", self.class_id);
    }
}

/// Remove `class_id` from the map if `lock` is still its entry and the map
/// plus the caller hold the only references.
fn release_entry(locks: &Mutex<LockMap>, class_id: &ClassId, lock: &Arc<AsyncMutex<()>>) {
    let mut locks = locks.lock();
    let idle = locks
        .get(class_id)
        .is_some_and(|entry| Arc::ptr_eq(entry, lock) && Arc::strong_count(entry) == 2);
    if idle {
        locks.remove(class_id);
    }
}

/// Lazily created per-class locks with a bounded wait.
pub struct ClassLockRegistry {
    locks: Arc<Mutex<LockMap>>,
    acquire_timeout: Duration,
}

impl ClassLockRegistry {
    /// Create a registry whose acquisitions give up after `acquire_timeout`.
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
            acquire_timeout,
        }
    }

    /// Enter the critical section for `class_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Concurrency`] if the lock is not obtained
    /// within the configured timeout.
    pub async fn acquire(&self, class_id: &ClassId) -> Result<ClassGuard, EnrollmentError> {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(class_id.clone()).or_default())
        };

        match tokio::time::timeout(self.acquire_timeout, Arc::clone(&lock).lock_owned()).await {
            Ok(guard) => {
                tracing::trace!("acquired lock for class {}", class_id);
                Ok(ClassGuard {
                    class_id: class_id.clone(),
                    locks: Arc::clone(&self.locks),
                    lock,
                    guard: Some(guard),
                })
            }
            Err(_) => {
                release_entry(&self.locks, class_id, &lock);
                tracing::warn!(
                    "timed out after {:?} waiting for class {} lock",
                    self.acquire_timeout,
                    class_id
                );
                Err(EnrollmentError::Concurrency(format!(
                    "class {class_id} is busy"
                )))
            }
        }
    }

    /// Drop entries nobody holds or waits on. Returns how many were removed.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Number of classes with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Whether no class has a lock entry.
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
