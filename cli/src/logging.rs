//! Subscriber setup. Logs go to stderr so stdout carries only response bytes.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. An unparsable filter falls back to `info`.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
