//! Process-wide logging setup shared by admingate binaries.

/// Initialize structured logging for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber construction (filter, format).
pub mod tracing;
