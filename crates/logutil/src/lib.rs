//! Utilities for logging.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single line per event, no timestamps.
    #[default]
    Compact,
    /// Timestamps, targets, file and line numbers.
    Full,
    Json,
}

/// Build the filter, letting `RUST_LOG` override the default level.
fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Install a global subscriber writing to stderr.
///
/// Returns an error if a global subscriber has already been set.
pub fn try_init(
    default_level: Level,
    format: LogFormat,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Compact => {
            let subscriber = builder.compact().without_time().with_target(false).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Full => {
            let subscriber = builder
                .with_file(true)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = builder.json().finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    }
}

/// Install a compact subscriber at INFO, ignoring an existing subscriber.
pub fn init() {
    let _ = try_init(Level::INFO, LogFormat::Compact);
}

static TEST_INIT: Once = Once::new();

/// Initialize logging for tests.
///
/// Output goes through the test writer so it is captured per test. Safe to
/// call from every test.
pub fn init_test() {
    TEST_INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_test_writer()
            .with_env_filter(env_filter(Level::DEBUG))
            .with_file(true)
            .with_line_number(true)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_test_is_idempotent() {
        init_test();
        init_test();
        tracing::debug!("logging initialized");
    }
}
