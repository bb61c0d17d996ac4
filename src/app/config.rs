// Server configuration, read from the environment (and .env when present)
use std::env;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got '{0}'")]
    InvalidPort(String),

    #[error("SEED_SAMPLE_TASKS must be true or false, got '{0}'")]
    InvalidSeedFlag(String),

    #[error("invalid server address {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed_sample_tasks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            seed_sample_tasks: true,
        }
    }
}

impl ServerConfig {
    // Reads HOST, PORT and SEED_SAMPLE_TASKS; unset or blank values keep their defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = read("HOST").unwrap_or(defaults.host);

        let port = match read("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => defaults.port,
        };

        let seed_sample_tasks = match read("SEED_SAMPLE_TASKS") {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::InvalidSeedFlag(value)),
            },
            None => defaults.seed_sample_tasks,
        };

        Ok(Self {
            host,
            port,
            seed_sample_tasks,
        })
    }

    // HOST must be an IPv4 or IPv6 literal
    pub fn address(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
