//! Logging setup shared by the binaries.
//!
//! `RUST_LOG` controls the filter (default: `info`).

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))
}

/// Routes panics from any thread or task through `tracing` instead of bare stderr.
///
/// Tokio contains a panic to the task it happened in, so a failing request or background
/// task is logged and the server keeps running.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(%location, "uncaught panic: {info}");
    }));
}
