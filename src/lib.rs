//! # Class Enrollment
//!
//! Capacity-managed class enrollment with a FIFO waitlist for gym operations.
//!
//! A class has a seat capacity supplied by the class catalogue. Members who
//! enroll while seats are free are `enrolled`; everyone after that is parked
//! on the class `waitlist` and woken in arrival order when a seat is released
//! by a cancellation or completion.
//!
//! ## Guarantees
//!
//! - **Capacity**: the number of enrolled records in a class never exceeds its
//!   capacity, under any number of concurrent callers.
//! - **No duplicates**: a member holds at most one enrolled or waitlisted
//!   record per class.
//! - **FIFO promotion**: the earliest waitlisted record (by enrollment date,
//!   then insertion order) is promoted, exactly one per freed seat.
//! - **Terminal states**: cancelled and completed records never change again.
//!
//! Enrolled counts are always derived from the records inside a per-class
//! critical section; there is no separate seat counter to drift.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use class_enrollment::builders::ServiceBuilder;
//! use class_enrollment::config::EnrollmentConfig;
//! use class_enrollment::core::{ClassCapacity, NewEnrollment};
//! use class_enrollment::infra::InMemoryDirectory;
//!
//! let directory = Arc::new(InMemoryDirectory::new());
//! directory.upsert_class("spin-6am", ClassCapacity::limited(20));
//! directory.add_member("m-42");
//!
//! let service = ServiceBuilder::in_memory(EnrollmentConfig::default(), directory).build()?;
//! let record = service
//!     .create_enrollment(NewEnrollment::new("spin-6am", "m-42"))
//!     .await?;
//! let summary = service.class_summary(&record.class_id).await?;
//! ```
//!
//! For complete scenarios, see `tests/enrollment_flow_test.rs` and
//! `tests/concurrency_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Enrollment records, admission, promotion, and the service.
pub mod core;
/// Configuration models for locking, retries, and pagination.
pub mod config;
/// Builders to construct the service from configuration.
pub mod builders;
/// Infrastructure adapters for the record store and directory lookups.
pub mod infra;
/// Request/response surface for an outer transport layer.
pub mod runtime;
/// Shared utilities.
pub mod util;
