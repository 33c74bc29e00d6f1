//! Configuration loading, validation, and management for Inkwell.
//!
//! Loads configuration from `~/.inkwell/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.inkwell/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Record store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,

    /// Credential handling
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// "sqlite" or "memory"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// SQLite connection string, e.g. `sqlite://inkwell.db`
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_backend() -> String {
    "sqlite".into()
}
fn default_database_url() -> String {
    "sqlite://inkwell.db".into()
}
fn default_max_connections() -> u32 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. `["*"]` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: u64,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_cors_max_age() -> u64 {
    12 * 60 * 60
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            max_age_secs: default_cors_max_age(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Server-side key mixed into every stored credential digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_pepper: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pepper = match self.credential_pepper {
            Some(_) => "[REDACTED]",
            None => "None",
        };
        f.debug_struct("AuthConfig")
            .field("credential_pepper", &pepper)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.inkwell/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides:
    /// - `INKWELL_HOST`
    /// - `INKWELL_PORT`
    /// - `INKWELL_DATABASE_URL`
    /// - `INKWELL_CREDENTIAL_PEPPER`
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("INKWELL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("INKWELL_PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("INKWELL_PORT is not a port: {port}"))
            })?;
        }
        if let Some(url) = lookup("INKWELL_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(pepper) = lookup("INKWELL_CREDENTIAL_PEPPER") {
            self.auth.credential_pepper = Some(pepper);
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".inkwell")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".into(),
            ));
        }

        match self.database.backend.as_str() {
            "memory" => {}
            "sqlite" if self.database.url.trim().is_empty() => {
                return Err(ConfigError::ValidationError(
                    "database.url is required for the sqlite backend".into(),
                ));
            }
            "sqlite" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "database.backend must be \"sqlite\" or \"memory\", got \"{other}\""
                )));
            }
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML (for `inkwell config`).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
