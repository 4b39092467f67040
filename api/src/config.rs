//! Environment-loaded configuration for the HTTP gateway: database,
//! upstream clients, and server bind address.
//!
//! Grounded on `indexer::config::{NetworkConfig, DatabaseConfig,
//! ServiceConfig}::from_env()`.

use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    key: "DATABASE_MAX_CONNECTIONS",
                    value: raw,
                    reason: e.to_string(),
                })?,
            Err(_) => 5,
        };
        Ok(Self {
            url,
            max_connections,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub bank_api_url: String,
    pub ledger_webhook_url: String,
    pub bank_api_key: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl UpstreamConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bank_api_url: env::var("BANK_API_URL")
                .unwrap_or_else(|_| "http://localhost:8090".to_string()),
            ledger_webhook_url: env::var("LEDGER_WEBHOOK_URL")
                .unwrap_or_else(|_| "http://localhost:8091".to_string()),
            bank_api_key: env::var("BANK_API_KEY").ok(),
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: std::net::SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    key: "PORT",
                    value: raw,
                    reason: e.to_string(),
                })?,
            Err(_) => 8080,
        };
        Ok(Self {
            bind_addr: std::net::SocketAddr::from(([0, 0, 0, 0], port)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            upstream: UpstreamConfig::from_env()?,
            server: ServerConfig::from_env()?,
        })
    }
}
