//! Logging initialization.
//!
//! All crates in this workspace log through `tracing`; this module wires up
//! the subscriber once at boot.

use tracing_subscriber::EnvFilter;

/// Initialize the logging system.
///
/// Sets up tracing with:
/// - Log level from `RUST_LOG` env var or the provided default
/// - Human-readable output on stderr, or JSONL when
///   `STOREFRONT_LOG_FORMAT=json`
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let json = std::env::var("STOREFRONT_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // Already-initialized is fine (tests, embedded use).
    let _ = result;
}
