//! Builders to construct the enrollment service from configuration.

pub mod service_builder;

pub use service_builder::ServiceBuilder;
