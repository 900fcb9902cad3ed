//! # Server Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`GASDEPOT_*`)
//! 2. Config file (`config.toml`, path from `GASDEPOT_CONFIG` or the
//!    platform config directory)
//! 3. Defaults (this file)
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/gasdepot/backoffice.db"
//! max_connections = 8
//! busy_timeout_ms = 5000
//!
//! [engine]
//! oversell = "reject"
//!
//! [history]
//! default_limit = 20
//! ```
//!
//! Read-only after startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use gasdepot_core::{OversellPolicy, MAX_PAGE_LIMIT};
use gasdepot_db::{DbConfig, RecorderConfig};
use serde::{Deserialize, Serialize};

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "GASDEPOT_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ListenConfig,
    pub database: DatabaseConfig,
    pub engine: RecorderConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        ListenConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `gasdepot.db` in the platform data directory.
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_database_path(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            connect_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Page size when a list request names none.
    pub default_limit: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            default_limit: gasdepot_core::DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

impl ServerConfig {
    /// Loads file config (if any), applies env overrides and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => ServerConfig::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies `GASDEPOT_*` overrides read through `lookup`.
    ///
    /// ## Environment Variables
    /// - `GASDEPOT_BIND_ADDR`
    /// - `GASDEPOT_PORT`
    /// - `GASDEPOT_DB_PATH`
    /// - `GASDEPOT_MAX_CONNECTIONS`
    /// - `GASDEPOT_OVERSELL_POLICY`: `allow_with_flag` or `reject`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("GASDEPOT_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("GASDEPOT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GASDEPOT_PORT".to_string()))?;
        }

        if let Some(path) = lookup("GASDEPOT_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("GASDEPOT_MAX_CONNECTIONS") {
            self.database.max_connections = max
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GASDEPOT_MAX_CONNECTIONS".to_string()))?;
        }

        if let Some(policy) = lookup("GASDEPOT_OVERSELL_POLICY") {
            self.engine.oversell = policy
                .parse::<OversellPolicy>()
                .map_err(|_| ConfigError::InvalidValue("GASDEPOT_OVERSELL_POLICY".to_string()))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }

        if self.history.default_limit == 0 || self.history.default_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::InvalidValue("history.default_limit".to_string()));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.bind_addr, self.server.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("server.bind_addr".to_string()))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "gasdepot", "backoffice")
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("gasdepot.db"))
        .unwrap_or_else(|| PathBuf::from("./gasdepot.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.oversell, OversellPolicy::AllowWithFlag);
        assert_eq!(config.history.default_limit, 20);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            [server]
            port = 9090

            [engine]
            oversell = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.engine.oversell, OversellPolicy::Reject);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GASDEPOT_PORT", "7000"),
            ("GASDEPOT_DB_PATH", "/tmp/depot.db"),
            ("GASDEPOT_OVERSELL_POLICY", "reject"),
        ]);

        let mut config = ServerConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/depot.db"));
        assert_eq!(config.engine.oversell, OversellPolicy::Reject);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ServerConfig::default();
        let result = config.apply_env(|key| (key == "GASDEPOT_PORT").then(|| "eighty".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        let result = config
            .apply_env(|key| (key == "GASDEPOT_OVERSELL_POLICY").then(|| "maybe".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = ServerConfig::default();
        config.history.default_limit = MAX_PAGE_LIMIT + 1;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.bind_addr = "not an address".to_string();
        assert!(config.validate().is_err());
    }
}
