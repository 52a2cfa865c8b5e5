//! Tracing infrastructure.
//!
//! Structured logging for the pipeline using the `tracing` and
//! `tracing-subscriber` crates, with environment-based filtering and a
//! choice of output formats. Initialization is idempotent so tests and
//! library consumers can call it freely.

use crate::config::Config;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for tracing.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Pretty-printed format with colors (for development).
    Pretty,
    /// Compact format without colors (for production).
    Compact,
    /// JSON format for structured logging (for log aggregation).
    Json,
}

/// Initialize tracing from pipeline configuration.
///
/// Reads the log level from `[application]` and installs a compact
/// subscriber; `RUST_LOG` still takes precedence when set.
pub fn init_from_config(config: &Config) -> Result<(), String> {
    let level = parse_log_level(&config.application.log_level)?;
    init(level, OutputFormat::Compact)
}

/// Initialize tracing with an explicit level and format.
///
/// This function is idempotent - if tracing is already initialized, it
/// returns Ok(()) without error. This makes it safe to call in tests.
pub fn init(level: Level, format: OutputFormat) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let result = match format {
        OutputFormat::Pretty => fmt()
            .pretty()
            .with_env_filter(env_filter)
            .try_init(),
        OutputFormat::Compact => fmt()
            .compact()
            .with_ansi(false)
            .with_env_filter(env_filter)
            .try_init(),
        OutputFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter)
            .try_init(),
    };

    result.or_else(|e| {
        // A second init attempt is expected in tests.
        if e.to_string()
            .contains("a global default trace dispatcher has already been set")
        {
            Ok(())
        } else {
            Err(format!("Failed to initialize tracing: {e}"))
        }
    })
}

/// Parse a log level string into a tracing [`Level`].
pub fn parse_log_level(level: &str) -> Result<Level, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        )),
    }
}
