//! Configuration models for locking, retries, pagination, and logging.

pub mod enrollment;

pub use enrollment::EnrollmentConfig;
