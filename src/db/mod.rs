//! Database connection and operations

pub mod collation;
pub mod movies;
pub mod schema;
pub mod sqlite_helpers;
pub mod transaction;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use crate::config::Config;
use crate::error::Result;

pub use collation::{natural_cmp, NATURAL_COLLATION};
pub use movies::{
    build_movie_query, ConsistencyWarning, HydrationPolicy, MovieQueryResult, MovieRepository, MOVIES,
};
pub use schema::ensure_schema;
pub use transaction::with_transaction;

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database described by `config`
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::connect_with(
            &config.database_path,
            config.database_max_connections,
            config.database_connect_timeout,
        )
        .await
    }

    /// Open a pool on `location`, a file path or a `sqlite:` URL.
    ///
    /// Every pooled connection enforces foreign keys and has the natural
    /// ordering collation registered. An in-memory database exists only on
    /// the connection that opened it, so its pool holds exactly one
    /// connection that is never recycled.
    pub async fn connect_with(location: &str, max_connections: u32, acquire_timeout: Duration) -> Result<Self> {
        let options = connect_options(location)?
            .create_if_missing(true)
            .foreign_keys(true)
            .collation(NATURAL_COLLATION, natural_cmp);

        let pool_options = SqlitePoolOptions::new().acquire_timeout(acquire_timeout);
        let pool_options = if is_in_memory(location) {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections)
        };
        let max_connections = pool_options.get_max_connections();

        let pool = pool_options.connect_with(options).await?;

        info!(location, max_connections, "Database connected");
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check out a pooled connection for reads outside a transaction
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Create missing tables and indexes
    pub async fn ensure_schema(&self) -> Result<()> {
        ensure_schema(&self.pool).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(location: &str) -> bool {
    location.starts_with("sqlite::memory:") || location == ":memory:"
}

fn connect_options(location: &str) -> Result<SqliteConnectOptions> {
    if is_in_memory(location) {
        return Ok(SqliteConnectOptions::from_str(location)?);
    }

    let path = location
        .strip_prefix("sqlite://")
        .or_else(|| location.strip_prefix("sqlite:"))
        .unwrap_or(location);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    Ok(SqliteConnectOptions::new().filename(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_locations() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory(":memory:"));
        assert!(!is_in_memory("sqlite://data/catalog.db"));
        assert!(!is_in_memory("catalog.db"));
    }
}
