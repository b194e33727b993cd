//! Logging for Docent.
//!
//! Logs go to stderr; stdout carries answers and `--json` payloads only.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Resolve the filter directive from an explicit level, then `RUST_LOG`, then `warn`.
///
/// The default is `warn` so an interactive session shows only answers unless
/// the user asks for more.
pub fn filter_directive(log_level: Option<&str>) -> String {
    log_level
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "warn".to_string())
}

/// Initialize the tracing subscriber with stderr output.
///
/// # Example
/// ```no_run
/// use docent_core::logging::{init_logging, LogFormat};
///
/// init_logging(Some("info"), false, LogFormat::Text).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool, format: LogFormat) -> AppResult<()> {
    let filter_str = filter_directive(log_level);

    let env_filter = EnvFilter::try_new(&filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", filter_str, e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(!no_color && supports_color()),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))
}

fn supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_wins() {
        assert_eq!(filter_directive(Some("debug")), "debug");
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let result = init_logging(Some("docent=notalevel"), true, LogFormat::Text);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
