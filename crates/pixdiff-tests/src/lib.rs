//! Integration tests for pixdiff crates.
//!
//! End-to-end checks that run normalization, strategy resolution, kernel
//! dispatch and difference synthesis together. Set `RUST_LOG=pixdiff=trace`
//! to see the pipeline while a test runs.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub mod fixtures;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        tracing::debug!("test tracing installed");
    });
}
