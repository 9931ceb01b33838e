//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Build the event filter: `RUST_LOG` when set, otherwise `default_level`.
///
/// An unparsable `default_level` falls back to `info`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(default_level: &str, json: bool) {
    let filter = env_filter(default_level);

    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init("debug", false);
        init("info", true);
    }

    #[test]
    fn garbage_level_still_builds_a_filter() {
        let _ = env_filter("not a [valid directive");
    }
}
