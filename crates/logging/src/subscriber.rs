//! crates/logging/src/subscriber.rs
//! Installation of the process-wide tracing subscriber.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::config::VerbosityConfig;

/// Environment variable that overrides the filter derived from verbosity flags.
pub const LOG_ENV_VAR: &str = "RDELTA_LOG";

/// Initialize tracing with the given verbosity configuration.
///
/// Events are written to stderr without timestamps, matching the terse
/// diagnostics of the command-line tools. When [`LOG_ENV_VAR`] is set its
/// value replaces the filter derived from `config`.
///
/// Returns `false` when a global subscriber was already installed, which
/// happens when a test harness runs several commands in one process.
pub fn init_tracing(config: VerbosityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.verbose > 2)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
