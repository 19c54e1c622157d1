//! Application configuration management

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::db::movies::HydrationPolicy;
use crate::logging::LogFormat;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database path, or a `sqlite://` URL
    pub database_path: String,

    /// Maximum pooled connections
    pub database_max_connections: u32,

    /// How long to wait for a pooled connection
    pub database_connect_timeout: Duration,

    /// What listings do with ids that vanish between the id query and loading
    pub hydration: HydrationPolicy,

    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same parsing as [`Config::from_env`], reading values from `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_path = lookup("DATABASE_PATH")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or_else(|| "./data/catalog.db".to_string());

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .context("Invalid DATABASE_MAX_CONNECTIONS")?;

        let connect_timeout_secs: u64 = lookup("DATABASE_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("Invalid DATABASE_CONNECT_TIMEOUT_SECS")?;

        let best_effort = lookup("CATALOG_BEST_EFFORT_HYDRATION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);
        let hydration = if best_effort {
            HydrationPolicy::BestEffort
        } else {
            HydrationPolicy::Strict
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse().context("Invalid LOG_FORMAT")?,
            None => LogFormat::default(),
        };

        Ok(Self {
            database_path,
            database_max_connections,
            database_connect_timeout: Duration::from_secs(connect_timeout_secs),
            hydration,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_path, "./data/catalog.db");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.database_connect_timeout, Duration::from_secs(30));
        assert_eq!(config.hydration, HydrationPolicy::BestEffort);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_database_path_preferred_over_url() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite://other.db"),
            ("DATABASE_PATH", "/tmp/movies.db"),
        ])
        .unwrap();
        assert_eq!(config.database_path, "/tmp/movies.db");

        let config = config_from(&[("DATABASE_URL", "sqlite://other.db")]).unwrap();
        assert_eq!(config.database_path, "sqlite://other.db");
    }

    #[test]
    fn test_strict_hydration_and_json_logs() {
        let config = config_from(&[
            ("CATALOG_BEST_EFFORT_HYDRATION", "false"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.hydration, HydrationPolicy::Strict);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(config_from(&[("DATABASE_MAX_CONNECTIONS", "many")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
