//! Environment-driven service configuration.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub nats_url: Option<String>,
    /// Bearer token every non-health route requires when set.
    pub api_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid { key: "PORT", message: e.to_string() })?,
            None => 8083,
        };
        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", message: e.to_string() })?,
            None => 10,
        };

        let config = Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DATABASE_URL"),
            max_connections,
            nats_url: get("NATS_URL"),
            api_token: get("API_TOKEN"),
        };
        tracing::debug!(config = ?config, "configuration loaded");
        Ok(config)
    }

    pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .field("nats_url", &self.nats_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
