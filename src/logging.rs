//! Tracing subscriber setup.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the
//! configuration's `log_level`. Lines go to stderr through a non-blocking
//! writer; keep the returned guard alive until the process exits so buffered
//! lines are flushed.

use crate::config::LogFormat;
use crate::error::{DataPipesError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for `level`, letting `RUST_LOG` take precedence.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber.
pub fn init(level: &str, format: LogFormat) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let registry = tracing_subscriber::registry().with(filter(level));

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init(),
    };
    installed.map_err(|e| DataPipesError::Logging(e.to_string()))?;
    Ok(guard)
}
