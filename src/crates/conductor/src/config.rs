//! Server configuration for conductor-server
//!
//! Loads and parses the conductor-server.toml configuration file with
//! database, engine, and server identification settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(toml::de::Error),
}

/// Server identification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfoConfig {
    /// Server name for identification (displayed to clients)
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerInfoConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

fn default_server_name() -> String {
    "conductor-server".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file path
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "conductor.db".to_string()
}

/// Execution engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-task timeout in seconds; a task exceeding it fails with "timeout"
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    /// Per-subscriber event buffer capacity (oldest events drop on overflow)
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
    /// Time-to-live for cached workflow definitions, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub definition_cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: default_task_timeout_secs(),
            stream_buffer: default_stream_buffer(),
            definition_cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_task_timeout_secs() -> u64 {
    60
}

fn default_stream_buffer() -> usize {
    64
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl EngineConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.definition_cache_ttl_secs)
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server identification
    #[serde(default)]
    pub server: ServerInfoConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ServerConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(ServerConfigError::ReadError)?;
        Self::from_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ServerConfigError> {
        toml::from_str(content).map_err(ServerConfigError::ParseError)
    }

    /// Load configuration from default location or environment
    ///
    /// Searches for config in:
    /// 1. CONFIG_PATH environment variable
    /// 2. ./config/conductor-server.toml
    /// 3. ./conductor-server.toml
    pub fn load() -> Result<Self, ServerConfigError> {
        if let Ok(config_path) = std::env::var("CONFIG_PATH") {
            return Self::from_file(config_path);
        }

        let paths = [
            PathBuf::from("config/conductor-server.toml"),
            PathBuf::from("./conductor-server.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Get database URL from configuration
    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.database.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_content = r#"
[server]
name = "conductor-test"

[database]
path = "test.db"

[engine]
task_timeout_secs = 30
stream_buffer = 16
definition_cache_ttl_secs = 120
"#;

        let config = ServerConfig::from_str(toml_content).unwrap();
        assert_eq!(config.server.name, "conductor-test");
        assert_eq!(config.database.path, "test.db");
        assert_eq!(config.engine.task_timeout_secs, 30);
        assert_eq!(config.engine.stream_buffer, 16);
        assert_eq!(config.engine.cache_ttl(), Duration::from_secs(120));
        assert_eq!(config.database_url(), "sqlite://test.db");
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::from_str("").unwrap();
        assert_eq!(config.server.name, "conductor-server");
        assert_eq!(config.database.path, "conductor.db");
        assert_eq!(config.engine.task_timeout_secs, 60);
        assert_eq!(config.engine.stream_buffer, 64);
        assert_eq!(config.engine.definition_cache_ttl_secs, 300);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ServerConfig::from_str("[engine]\ntask_timeout_secs = 5\n").unwrap();
        assert_eq!(config.engine.task_timeout_secs, 5);
        assert_eq!(config.engine.stream_buffer, 64);
        assert_eq!(config.database.path, "conductor.db");
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conductor-server.toml");
        std::fs::write(&path, "[database]\npath = \"from-file.db\"\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.database.path, "from-file.db");

        let err = ServerConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ServerConfigError::ReadError(_)));
    }
}
