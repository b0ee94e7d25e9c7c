//! Service configuration file.
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:8080"
//! workers = 4
//!
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [static_files]
//! prefix = "/static"
//! dir = "./public"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogFormat};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub static_files: Option<StaticFilesConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: String,
    /// `may` worker threads; the runtime default when absent
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            workers: None,
        }
    }
}

/// Overrides for the environment-derived [`LogConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticFilesConfig {
    #[serde(default = "default_static_prefix")]
    pub prefix: String,
    pub dir: PathBuf,
}

fn default_static_prefix() -> String {
    "/static".to_string()
}

impl AppConfig {
    /// Parse TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid configuration")
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In config file {}", path.display()))
    }

    /// Layer the file's logging settings over `base`
    pub fn log_config(&self, mut base: LogConfig) -> LogConfig {
        if let Some(level) = &self.logging.level {
            base.log_level = level.clone();
        }
        if let Some(format) = &self.logging.format {
            base.format = LogFormat::parse(format);
        }
        base
    }
}
