//! Tracing bootstrap shared by the binary and long-lived embedders.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a JSON `fmt` subscriber filtered by `RUST_LOG`.
///
/// A subscriber installed earlier wins; the failure is logged, not returned.
pub fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}
