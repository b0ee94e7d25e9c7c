//! Structured logging setup.
//!
//! `tracing-subscriber` with an [`EnvFilter`] and a JSON or pretty `fmt`
//! layer, optionally written through a `tracing-appender` non-blocking
//! writer. Settings come from `TREEROUTER_LOG_*` environment variables:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `TREEROUTER_LOG_LEVEL` | `info` | base level |
//! | `TREEROUTER_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `TREEROUTER_LOG_FILTER` | | extra comma separated directives |
//! | `TREEROUTER_LOG_ASYNC` | `true` | buffer output on a background thread |
//! | `TREEROUTER_LOG_LOCATION` | `false` | include file and line |
//!
//! `RUST_LOG`, when set, replaces the base level.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything but `pretty` selects JSON
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives, comma separated (`treerouter::router=debug`)
    pub target_filter: Option<String>,
    pub async_logging: bool,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            async_logging: true,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Read the `TREEROUTER_LOG_*` variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for
    /// missing or unparsable values
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| v.trim().parse::<bool>().ok())
                .unwrap_or(default)
        };
        Self {
            log_level: lookup("TREEROUTER_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("TREEROUTER_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.format),
            target_filter: lookup("TREEROUTER_LOG_FILTER").filter(|f| !f.trim().is_empty()),
            async_logging: flag("TREEROUTER_LOG_ASYNC", defaults.async_logging),
            include_location: flag("TREEROUTER_LOG_LOCATION", defaults.include_location),
        }
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .with_context(|| format!("Invalid log level {:?}", self.log_level))?;
        filter = filter.add_directive(
            "may_minihttp=warn"
                .parse()
                .context("Invalid built-in log directive")?,
        );
        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                filter = filter.add_directive(
                    directive
                        .parse()
                        .with_context(|| format!("Invalid log filter directive {directive:?}"))?,
                );
            }
        }
        Ok(filter)
    }
}

/// Keeps the background writer alive; drop it to flush on shutdown
#[must_use = "dropping the guard stops buffered logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Fails on an invalid filter directive, or if a global subscriber is
/// already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<LogGuard> {
    let (writer, worker) = if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(LogGuard { _worker: worker })
}

/// [`init_logging_with_config`] with settings from the environment
pub fn init_logging() -> Result<LogGuard> {
    init_logging_with_config(&LogConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
    }

    #[test]
    fn test_from_lookup_defaults() {
        assert_eq!(LogConfig::from_lookup(|_| None), LogConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TREEROUTER_LOG_LEVEL", "debug"),
            ("TREEROUTER_LOG_FORMAT", "pretty"),
            ("TREEROUTER_LOG_FILTER", "treerouter::router=trace"),
            ("TREEROUTER_LOG_ASYNC", "false"),
            ("TREEROUTER_LOG_LOCATION", "not-a-bool"),
        ]
        .into_iter()
        .collect();
        let config = LogConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.target_filter.as_deref(), Some("treerouter::router=trace"));
        assert!(!config.async_logging);
        assert!(!config.include_location);
    }

    #[test]
    fn test_bad_directive_is_an_error() {
        let config = LogConfig {
            target_filter: Some("treerouter=notalevel".to_string()),
            ..LogConfig::default()
        };
        assert!(config.env_filter().is_err());
    }
}
