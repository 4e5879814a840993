//! Tracing setup: a daily log file under the export directory for the TUI,
//! stderr for headless runs.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use story_core::config::{AppConfig, DEFAULT_LOG_FILTER};

pub const LOG_FILE_NAME: &str = "storyteller.log";

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process so buffered
/// lines reach the file.
pub fn init(config: &AppConfig, headless: bool) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if headless {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            )
            .init();
        return None;
    }

    // The terminal belongs to the TUI, so logs only go to the file
    let log_dir = config.log_dir();
    match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false)
                        .with_filter(env_filter),
                )
                .init();
            Some(guard)
        }
        Err(err) => {
            eprintln!(
                "Warning: failed to create logs directory {}: {err}",
                log_dir.display()
            );
            None
        }
    }
}
