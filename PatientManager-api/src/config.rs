//! Process configuration read from the environment

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use tracing::info;

use patient_manager_data::database::{DatabaseConfig, DatabaseError};
use patient_manager_domain::services::{SortConfig, SortError};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Database configuration error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Sort configuration error: {0}")]
    Sort(#[from] SortError),

    #[error("Invalid listen address {0}")]
    InvalidAddress(String),
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind (HOST, default 0.0.0.0)
    pub host: String,
    /// Port to bind (PORT, default 3000)
    pub port: u16,
    pub database: DatabaseConfig,
    pub sort: SortConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", host, raw)))?,
            None => 3000,
        };

        let config = Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            sort: SortConfig::from_lookup(&lookup)?,
            host,
            port,
        };
        info!("Configuration loaded (listen on {}:{})", config.host, config.port);
        Ok(config)
    }

    /// Socket address to listen on
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_manager_data::database::DatabaseType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(config.database.db_type, DatabaseType::Sqlite);
        assert_eq!(config.sort, SortConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(|name| match name {
            "HOST" => Some("127.0.0.1".to_string()),
            "PORT" => Some("8080".to_string()),
            "DB_TYPE" => Some("memory".to_string()),
            "SORTABLE_FIELDS" => Some("bmi".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database.db_type, DatabaseType::Memory);
        assert!(config.sort.resolve_field("bmi").is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(|name| (name == "PORT").then(|| "http".to_string())),
            Err(ConfigError::InvalidAddress(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(|name| (name == "DB_TYPE").then(|| "oracle".to_string())),
            Err(ConfigError::Database(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(|name| (name == "SORTABLE_FIELDS").then(|| "shoe".to_string())),
            Err(ConfigError::Sort(_))
        ));
    }
}
