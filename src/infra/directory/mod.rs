//! Class and member directory backends.

pub mod memory;

pub use memory::InMemoryDirectory;
