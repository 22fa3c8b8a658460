//! Runtime configuration read from the environment.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct InfraConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub sweep_interval: Duration,
}

// Keeps credentials in the URL out of logs.
impl std::fmt::Debug for InfraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfraConfig")
            .field("database_url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

impl InfraConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = parse_or(
            "ORGWARD_DB_MAX_CONNECTIONS",
            get("ORGWARD_DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "ORGWARD_DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        let acquire_timeout_secs = parse_or(
            "ORGWARD_DB_ACQUIRE_TIMEOUT_SECS",
            get("ORGWARD_DB_ACQUIRE_TIMEOUT_SECS"),
            DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )?;
        let sweep_interval_secs = parse_or(
            "ORGWARD_SWEEP_INTERVAL_SECS",
            get("ORGWARD_SWEEP_INTERVAL_SECS"),
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        if sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "ORGWARD_SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
        })
    }

    /// Open the connection pool and establish the first connection.
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.database_url)
            .await
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
