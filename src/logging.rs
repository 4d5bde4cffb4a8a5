//! Tracing setup for the binary.
//!
//! Logs go to stderr so stdout stays clean for reports and `--json` output.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CRISK_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Pick the filter directive: `RUST_LOG`, then `CRISK_LOG`, then the CLI level.
pub fn filter_directive(rust_log: Option<String>, crisk_log: Option<String>, cli_level: &str) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .or_else(|| crisk_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| cli_level.to_string())
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(cli_level: &str) {
    let directive = filter_directive(
        std::env::var("RUST_LOG").ok(),
        std::env::var(LOG_ENV).ok(),
        cli_level,
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
