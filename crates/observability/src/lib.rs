//! Tracing and logging (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(default_level: &str, json: bool) {
    tracing::init(default_level, json);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
