use std::env;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Server configuration read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Bind address
    pub host: IpAddr,
    /// Bind port
    pub port: u16,
    /// Deployment environment, reported by the health check
    pub environment: String,
    /// Default tracing filter when RUST_LOG is not set
    pub log_level: String,
    /// Whether Swagger UI is mounted
    pub enable_swagger: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            enable_swagger: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        info!(
            "Configuration loaded: env={}, swagger={}",
            config.environment, config.enable_swagger
        );
        Ok(config)
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(value) => value.parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                name: "HOST".to_string(),
                value,
            })?,
            None => defaults.host,
        };

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                value,
            })?,
            None => defaults.port,
        };

        let enable_swagger = match lookup("ENABLE_SWAGGER") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                name: "ENABLE_SWAGGER".to_string(),
                value,
            })?,
            None => defaults.enable_swagger,
        };

        Ok(Self {
            host,
            port,
            environment: lookup("APP_ENV").unwrap_or(defaults.environment),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            enable_swagger,
        })
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
