//! CLI configuration: YAML file plus environment overrides.

use std::env::VarError;
use std::path::Path;

use serde::Deserialize;
use tailnet_directory::DirectoryConfig;

use crate::error::{CliError, CliResult};

/// Root CLI configuration.
///
/// ```yaml
/// directory:
///   tailnet: example.com
///   credentials:
///     type: api_key
///     key: tskey-api-...
/// logging:
///   level: info
///   format: text
/// operation_timeout_secs: 120
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Upper bound for a whole command, across all of its remote calls.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            logging: LoggingConfig::default(),
            operation_timeout_secs: default_operation_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_operation_timeout() -> u64 {
    120
}

impl CliConfig {
    /// Load from an optional YAML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> CliResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> CliResult<()> {
        self.apply_overrides_from(|key| std::env::var(key))
    }

    /// Apply overrides from a custom variable reader.
    ///
    /// A value that does not parse is rejected, like a malformed file.
    pub fn apply_overrides_from<F>(&mut self, reader: F) -> CliResult<()>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        self.directory.apply_overrides_from(&reader);
        if let Ok(level) = reader("TAILNET_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = reader("TAILNET_LOG_FORMAT") {
            self.logging.format = match format.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" => LogFormat::Text,
                _ => {
                    return Err(CliError::Config(format!(
                        "TAILNET_LOG_FORMAT must be text or json, got '{format}'"
                    )))
                }
            };
        }
        if let Ok(timeout) = reader("TAILNET_OPERATION_TIMEOUT_SECS") {
            self.operation_timeout_secs = timeout.trim().parse().map_err(|e| {
                CliError::Config(format!(
                    "TAILNET_OPERATION_TIMEOUT_SECS must be a number of seconds, got '{timeout}': {e}"
                ))
            })?;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CliResult<()> {
        self.directory.validate()?;
        if self.operation_timeout_secs == 0 {
            return Err(CliError::Config(
                "operation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
