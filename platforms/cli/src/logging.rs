//! Diagnostic logging for the command-line front end.
//!
//! The library only emits `tracing` events; this installs the subscriber that prints them.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads the `RUST_LOG` env var and defaults to `warn` if unset. Output goes to stderr in
/// compact format so it never mixes with run results on stdout.
///
/// # Example
/// ```bash
/// RUST_LOG=tmsim=debug tmsim run --builtin palindrome abba
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
