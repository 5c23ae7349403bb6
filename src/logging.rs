//! # Structured Logging
//!
//! Environment-aware structured logging for lifecycle operations: a
//! human-readable console layer plus a JSON file layer under the configured
//! log directory, so a failed external-tool invocation can be diagnosed
//! after the host process has moved on.

use std::fs;
use std::process;
use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console and file logging once per process
///
/// Later calls are no-ops, and an already-installed global subscriber (for
/// example the host's own) is left in place.
pub fn init_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = current_environment();
        let level = level_for(&environment);

        if !config.directory.exists() {
            if fs::create_dir_all(&config.directory).is_err() {
                return;
            }
        }

        let file_name = format!(
            "bayeswave-adapter.{}.{}.log",
            process::id(),
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let file_appender = tracing_appender::rolling::never(&config.directory, file_name);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(EnvFilter::new(level)),
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(EnvFilter::new(level)),
            );

        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already installed, keeping it");
        }

        // The writer guard must outlive the process for the file layer to flush
        std::mem::forget(guard);
    });
}

fn current_environment() -> String {
    std::env::var("BAYESWAVE_ADAPTER_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn level_for(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_for("production"), "info");
        assert_eq!(level_for("development"), "debug");
        assert_eq!(level_for("test"), "debug");
        assert_eq!(level_for("anything-else"), "debug");
    }
}
