//! Development-time tracing diagnostics.
//!
//! Everything the user is meant to read goes through the console, on
//! stdout/stderr directly. Tracing is for debugging the tool itself: it
//! reads `RUST_LOG`, defaults to `warn`, and writes compact output to
//! stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// # Example
/// ```bash
/// RUST_LOG=sidekick=debug sidekick
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
