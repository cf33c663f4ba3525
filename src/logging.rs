//! Thin `tracing-subscriber` initialization. Stands in for the excluded
//! line-logger facility (`original_source/custom_logging.py`), built the
//! idiomatic-Rust way the rest of the retrieved pack uses instead of
//! hand-rolling a file logger.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber reading its filter from
/// `RUST_LOG`, defaulting to `info` when unset.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
