//! Process-wide tracing setup shared by the binaries.

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, format).
pub mod tracing;

pub use self::tracing::{LogFormat, init_with};
