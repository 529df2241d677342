//! Enrollment record store backends.

pub mod memory;

pub use memory::InMemoryEnrollmentStore;
