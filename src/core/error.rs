//! Error types for enrollment operations.

use std::fmt;

use thiserror::Error;

use crate::core::{EnrollmentId, EnrollmentStatus};

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A class from the class catalogue.
    Class,
    /// A member from the membership directory.
    Member,
    /// An enrollment record.
    Enrollment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Member => "member",
            Self::Enrollment => "enrollment",
        })
    }
}

/// Errors produced by enrollment components.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// Referenced class, member, or enrollment does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Which kind of entity was missing.
        entity: EntityKind,
        /// Identifier that was looked up.
        id: String,
    },
    /// Duplicate active enrollment or a full class on manual promotion.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Operation is not allowed from the record's current status.
    #[error("invalid state: cannot {operation} enrollment {id} while {status}")]
    InvalidState {
        /// Record the operation targeted.
        id: EnrollmentId,
        /// Status that forbids the operation.
        status: EnrollmentStatus,
        /// Attempted operation.
        operation: &'static str,
    },
    /// Caller input that can never succeed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Per-class lock not acquired in time; retried internally.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),
    /// Store or collaborator failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

impl EnrollmentError {
    /// Missing entity of the given kind.
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Operation rejected by the record's status.
    pub const fn invalid_state(
        id: EnrollmentId,
        status: EnrollmentStatus,
        operation: &'static str,
    ) -> Self {
        Self::InvalidState {
            id,
            status,
            operation,
        }
    }

    /// Only transient races are worth another attempt.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Concurrency(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
