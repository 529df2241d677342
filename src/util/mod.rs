//! Shared utilities.

pub mod clock;
pub mod retry;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use retry::{retry_transient, RetryPolicy};
pub use telemetry::init_tracing;
