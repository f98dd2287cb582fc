// ==========================================
// Logging setup
// ==========================================
// tracing + tracing-subscriber
// Level comes from RUST_LOG
// ==========================================

use crate::config::LogFormat;
use tracing_subscriber::{fmt, EnvFilter};

// A second init is expected (tests, embedding hosts); the first subscriber wins
fn report_existing(result: Result<(), Box<dyn std::error::Error + Send + Sync>>) {
    if let Err(e) = result {
        tracing::debug!(error = %e, "global subscriber already set, keeping it");
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Human-readable logs on stderr
///
/// # Environment
/// - RUST_LOG: filter (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=poultry_ledger=trace
///
/// # Example
/// ```no_run
/// use poultry_ledger::logging;
/// logging::init();
/// ```
pub fn init() {
    let result = fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
    report_existing(result);
}

/// One JSON object per line on stderr, for log shippers
pub fn init_json() {
    let result = fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(false)
        .with_writer(std::io::stderr)
        .try_init();
    report_existing(result);
}

pub fn init_with_format(format: LogFormat) {
    match format {
        LogFormat::Pretty => init(),
        LogFormat::Json => init_json(),
    }
}

/// Logging for tests: debug level, captured by the test harness
pub fn init_test() {
    let result = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
    report_existing(result);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_keeps_first_subscriber() {
        init_test();
        init_test();
        init();
        tracing::info!("still logging");
    }
}
