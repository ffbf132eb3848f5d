//! Tracing setup shared by the orchestrator and the workers.
//!
//! Logs go to stderr; stdout carries the rendered results.

use tracing::trace;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set, otherwise a level picked by the `-v` count.
pub fn log_filter(verbose: u8) -> String {
    if let Ok(filter) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !filter.is_empty() {
            return filter;
        }
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

/// Installs the global subscriber and returns the filter in use.
pub fn init_logging(verbose: u8) -> String {
    let filter = log_filter(verbose);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&filter))
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .try_init();

    trace!("args: {:?}", std::env::args().collect::<Vec<_>>());
    filter
}
