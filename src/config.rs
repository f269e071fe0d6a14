//! TOML-based application configuration with environment overrides.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level application configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`AppConfig::from_toml_file`], then layer environment variables on top
/// with [`AppConfig::apply_env`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server parameters.
    #[serde(default)]
    pub server: ServerConfig,
    /// Log output parameters.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind: String,
    /// Listening port (must be > 0).
    pub port: u16,
    /// Frontend origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Upper bound on an upload request body (bytes).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost".to_string(),
            ],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Log output parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"server.port"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Environment variable overriding `server.port`.
pub const ENV_PORT: &str = "MICROGRID_PORT";
/// Environment variable overriding `server.bind`.
pub const ENV_BIND: &str = "MICROGRID_BIND";
/// Environment variable overriding `server.cors_origins` (comma-separated).
pub const ENV_CORS_ORIGINS: &str = "MICROGRID_CORS_ORIGINS";

impl AppConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if an override cannot be parsed.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if an override cannot be parsed.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::new(ENV_PORT, format!("\"{port}\" is not a valid port"))
            })?;
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind.trim().to_string();
        }
        if let Some(origins) = lookup(ENV_CORS_ORIGINS) {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.server;

        if s.port == 0 {
            errors.push(ConfigError::new("server.port", "must be > 0"));
        }
        if s.bind.trim().is_empty() {
            errors.push(ConfigError::new("server.bind", "must not be empty"));
        }
        if s.max_upload_bytes == 0 {
            errors.push(ConfigError::new("server.max_upload_bytes", "must be > 0"));
        }
        for (i, origin) in s.cors_origins.iter().enumerate() {
            let scheme_ok = origin.starts_with("http://") || origin.starts_with("https://");
            let printable = origin.chars().all(|c| c.is_ascii_graphic());
            if !scheme_ok || !printable || origin.ends_with('/') {
                errors.push(ConfigError::new(
                    format!("server.cors_origins[{i}]"),
                    format!("\"{origin}\" must be an http(s) origin without a trailing slash"),
                ));
            }
        }
        if self.logging.filter.trim().is_empty() {
            errors.push(ConfigError::new("logging.filter", "must not be empty"));
        }

        errors
    }
}
