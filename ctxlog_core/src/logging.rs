//! Diagnostics for the library itself.
//!
//! ctxlog_core reports its own events (resolved host values, failed writes)
//! through `tracing`. Binaries install a subscriber here.

use crate::engine::RECORD_TARGET;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize diagnostics with a specific default level
///
/// # Arguments
/// * `default_level` - Default filter directive (debug, info, warn, error)
///
/// This can still be overridden by RUST_LOG environment variable.
/// Output goes to stderr in the compact format.
pub fn init_with_level(default_level: &str) {
    install(build_filter(rust_log().as_deref(), default_level, false));
}

/// Initialize diagnostics for use with [`TracingEngine`](crate::TracingEngine)
///
/// Same as [`init_with_level`], except records forwarded by the engine always
/// pass: they were already filtered by the logger's own level, and RUST_LOG
/// cannot hide them.
pub fn init_forwarding(default_level: &str) {
    install(build_filter(rust_log().as_deref(), default_level, true));
}

fn rust_log() -> Option<String> {
    std::env::var(EnvFilter::DEFAULT_ENV).ok()
}

fn install(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Filter from RUST_LOG (if set and valid) or the default directive
fn build_filter(rust_log: Option<&str>, default_level: &str, forward_records: bool) -> EnvFilter {
    let filter = rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    if forward_records {
        filter.add_directive(record_directive())
    } else {
        filter
    }
}

fn record_directive() -> Directive {
    format!("{}={}", RECORD_TARGET, LevelFilter::TRACE)
        .parse()
        .unwrap_or_else(|_| LevelFilter::TRACE.into())
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
