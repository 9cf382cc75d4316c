//! Configuration management for auth0-export
//!
//! This module handles loading, parsing, and validating configuration:
//! - Configuration file (TOML format)
//! - Defaults for everything except credentials
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values
//!
//! Levels 1 and 2 are merged by the CLI layer before they are applied on top
//! of the loaded file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientSettings;
use crate::error::{ConfigError, Result};
use crate::export::{DEFAULT_FIELDS, FieldSpec};

/// Largest page size the Management API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tenant and credentials
    #[serde(default)]
    pub auth0: Auth0Config,

    /// Export layout and output
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Auth0 tenant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth0Config {
    /// Tenant domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Machine-to-machine application client ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Machine-to-machine application client secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Comma-separated list of columns
    #[serde(default = "default_fields")]
    pub fields: String,

    /// Users fetched per request
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Output file (stdout when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_fields() -> String {
    DEFAULT_FIELDS.to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_delimiter() -> char {
    ','
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for Auth0Config {
    fn default() -> Self {
        Self {
            domain: None,
            client_id: None,
            client_secret: None,
            timeout: default_timeout(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            page_size: default_page_size(),
            delimiter: default_delimiter(),
            output: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// path is tried and a missing file yields the default configuration.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> std::result::Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Copy of this configuration with the client secret masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.auth0.client_secret.is_some() {
            config.auth0.client_secret = Some("***".to_string());
        }
        config
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".auth0-export")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// Credentials are not checked here; see [`Config::client_settings`].
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.export.page_size) {
            return Err(ConfigError::InvalidValue {
                field: "export.page_size".to_string(),
                value: self.export.page_size.to_string(),
            });
        }

        let d = self.export.delimiter;
        if !d.is_ascii() || matches!(d, '"' | '\n' | '\r') {
            return Err(ConfigError::InvalidValue {
                field: "export.delimiter".to_string(),
                value: d.escape_default().to_string(),
            });
        }

        if self.auth0.timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth0.timeout".to_string(),
                value: "0".to_string(),
            });
        }

        self.field_spec()?;
        Ok(())
    }

    /// Parsed column layout
    pub fn field_spec(&self) -> std::result::Result<FieldSpec, ConfigError> {
        FieldSpec::parse(&self.export.fields)
    }

    /// Request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.auth0.timeout)
    }

    /// Tenant settings for the management client
    ///
    /// # Returns
    /// * `Result<ClientSettings, ConfigError>` - Settings, or the first missing credential
    pub fn client_settings(&self) -> std::result::Result<ClientSettings, ConfigError> {
        fn required(value: &Option<String>, name: &str) -> std::result::Result<String, ConfigError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingField(name.to_string()))
        }

        Ok(ClientSettings {
            domain: required(&self.auth0.domain, "domain (--domain / AUTH0_DOMAIN)")?,
            client_id: required(&self.auth0.client_id, "client_id (--client-id / AUTH0_CLIENT_ID)")?,
            client_secret: required(
                &self.auth0.client_secret,
                "client_secret (--client-secret / AUTH0_CLIENT_SECRET)",
            )?,
            timeout: self.request_timeout(),
        })
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
