//! Logger setup
//!
//! Installs a `tracing-subscriber` pipeline for the lines notifiers log
//! locally. Libraries embedding this crate can skip it and install their own
//! subscriber; every log line goes through `tracing`.
//!
//! The `NOTIST_LOG` environment variable, when set, overrides the configured
//! level with a full `EnvFilter` directive.

pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "NOTIST_LOG";

/// Initialize the global subscriber with the given configuration
///
/// # Errors
///
/// Fails if the configuration is invalid or a global subscriber is already
/// installed.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = build_filter(&config);
    let use_ansi = config.colored && config.format != LogFormat::Json && is_tty(config.target);

    let result = match (config.format, config.target) {
        (LogFormat::Full, LogTarget::Stdout) => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(config.with_target)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (LogFormat::Full, LogTarget::Stderr) => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(config.with_target)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (LogFormat::Compact, LogTarget::Stdout) => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(config.with_target)
                    .compact()
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (LogFormat::Compact, LogTarget::Stderr) => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(config.with_target)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (LogFormat::Json, LogTarget::Stdout) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).json().with_writer(std::io::stdout))
            .try_init(),
        (LogFormat::Json, LogTarget::Stderr) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).json().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| LoggerError::init(e.to_string()))?;
    Ok(())
}

/// `NOTIST_LOG` if it parses, the configured level otherwise
pub(crate) fn build_filter(config: &LoggerConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn is_tty(target: LogTarget) -> bool {
    match target {
        LogTarget::Stdout => std::io::stdout().is_terminal(),
        LogTarget::Stderr => std::io::stderr().is_terminal(),
    }
}
