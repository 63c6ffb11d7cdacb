//! Configuration module for filedrop.

use serde::Deserialize;
use std::path::Path;

use crate::{FiledropError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upload store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Store root directory. Created on first upload.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Lowercase extensions accepted for upload.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_storage_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_allowed_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "pdf", "doc", "docx", "txt", "zip"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filedrop.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web front-end configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve a prebuilt front-end.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to the front-end directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_static_path() -> String {
    "web/dist".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            serve_static: false,
            static_path: default_static_path(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload store configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Web front-end configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FiledropError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FiledropError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - `FILEDROP_STORAGE_PATH`: store root directory
    /// - `FILEDROP_PORT`: listen port (ignored if not a valid port)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FILEDROP_STORAGE_PATH") {
            if !path.is_empty() {
                self.files.storage_path = path;
            }
        }

        if let Ok(port) = std::env::var("FILEDROP_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid FILEDROP_PORT"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.storage_path.is_empty() {
            return Err(FiledropError::Config(
                "files.storage_path must not be empty".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(FiledropError::Config(
                "files.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        if self.files.allowed_extensions.is_empty() {
            return Err(FiledropError::Config(
                "files.allowed_extensions must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);

        assert_eq!(config.files.storage_path, "uploads");
        assert_eq!(config.files.max_upload_size_mb, 10);
        assert_eq!(config.files.max_upload_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.files.allowed_extensions.len(), 9);
        assert!(config.files.allowed_extensions.contains(&"docx".to_string()));

        assert!(config.web.cors_origins.is_empty());
        assert!(!config.web.serve_static);
        assert_eq!(config.web.static_path, "web/dist");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/filedrop.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[files]
storage_path = "/srv/uploads"
max_upload_size_mb = 25
allowed_extensions = ["png", "txt"]

[web]
cors_origins = ["http://localhost:5173"]
serve_static = true
static_path = "public"

[logging]
level = "debug"
file = ""
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.files.storage_path, "/srv/uploads");
        assert_eq!(config.files.max_upload_size_mb, 25);
        assert_eq!(config.files.allowed_extensions, vec!["png", "txt"]);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert!(config.web.serve_static);
        assert_eq!(config.web.static_path, "public");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[files]
max_upload_size_mb = 1
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.files.max_upload_size_mb, 1);
        assert_eq!(config.files.storage_path, "uploads");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.web.static_path, "web/dist");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.files.storage_path, "uploads");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");
        match result {
            Err(FiledropError::Config(msg)) => assert!(msg.contains("config parse error")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(FiledropError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides() {
        let original_path = std::env::var("FILEDROP_STORAGE_PATH").ok();
        let original_port = std::env::var("FILEDROP_PORT").ok();

        std::env::set_var("FILEDROP_STORAGE_PATH", "/tmp/filedrop-env");
        std::env::set_var("FILEDROP_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.files.storage_path, "/tmp/filedrop-env");
        assert_eq!(config.server.port, 3000);

        match original_path {
            Some(val) => std::env::set_var("FILEDROP_STORAGE_PATH", val),
            None => std::env::remove_var("FILEDROP_STORAGE_PATH"),
        }
        match original_port {
            Some(val) => std::env::set_var("FILEDROP_PORT", val),
            None => std::env::remove_var("FILEDROP_PORT"),
        }
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.files.max_upload_size_mb = 0;
        assert!(matches!(config.validate(), Err(FiledropError::Config(_))));

        let mut config = Config::default();
        config.files.allowed_extensions.clear();
        assert!(matches!(config.validate(), Err(FiledropError::Config(_))));
    }
}
