use crate::config::LoggingConfig;
use crate::error::{DrinkifyError, Result};
use std::fs;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Daily-rolling log file under `config.dir`, created if missing.
pub fn file_appender(config: &LoggingConfig) -> Result<RollingFileAppender> {
    fs::create_dir_all(&config.dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_name.clone())
        .build(&config.dir)
        .map_err(|e| {
            DrinkifyError::Config(format!(
                "Cannot open log file in '{}': {}",
                config.dir.display(),
                e
            ))
        })
}

/// Initializes logging with a JSON file layer and a console layer.
///
/// The console writes to stderr so command output on stdout stays clean, and
/// only shows warnings unless `RUST_LOG` says otherwise. When the log
/// directory is not writable the file layer is skipped. The returned guard
/// must be held until exit so buffered file logs are flushed.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    fn console_layer<S>() -> impl tracing_subscriber::Layer<S>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let console_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drinkify=warn"));
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
    }

    match file_appender(config) {
        Ok(appender) => {
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .json()
                .with_writer(non_blocking_writer)
                .with_filter(EnvFilter::new("drinkify=debug"));

            tracing_subscriber::registry()
                .with(file_layer)
                .with(console_layer())
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry().with(console_layer()).init();
            warn!("File logging disabled: {}", e);
            None
        }
    }
}
