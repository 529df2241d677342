//! Infrastructure adapters for the record store and directory lookups.

pub mod directory;
pub mod store;

pub use directory::InMemoryDirectory;
pub use store::InMemoryEnrollmentStore;
