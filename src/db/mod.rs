mod dialect;
mod error;
#[cfg(feature = "database-mysql")]
pub mod mysql;
#[cfg(feature = "database-postgres")]
pub mod postgres;
pub mod repos;
#[cfg(feature = "database-sqlite")]
pub mod sqlite;

#[cfg(all(test, feature = "database-sqlite"))]
pub mod tests;

use std::sync::Arc;

pub use dialect::SqlDialect;
pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

struct CachedRepos {
    catalog: Arc<dyn CatalogRepo>,
    rows: Arc<dyn RowRepo>,
}

enum PoolStorage {
    #[cfg(feature = "database-sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(feature = "database-postgres")]
    Postgres(sqlx::PgPool),
    #[cfg(feature = "database-mysql")]
    MySql(sqlx::MySqlPool),
    #[cfg(not(any(
        feature = "database-sqlite",
        feature = "database-postgres",
        feature = "database-mysql"
    )))]
    _None(std::convert::Infallible),
}

/// Connection pool for the inspected database.
///
/// Repositories are cached at construction time to avoid allocation on each access.
pub struct DbPool {
    inner: PoolStorage,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    #[cfg(feature = "database-sqlite")]
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos {
            catalog: Arc::new(sqlite::SqliteCatalogRepo::new(pool.clone())),
            rows: Arc::new(sqlite::SqliteRowRepo::new(pool.clone())),
        };
        Self {
            inner: PoolStorage::Sqlite(pool),
            repos,
        }
    }

    #[cfg(feature = "database-postgres")]
    pub fn from_postgres(pool: sqlx::PgPool) -> Self {
        let repos = CachedRepos {
            catalog: Arc::new(postgres::PostgresCatalogRepo::new(pool.clone())),
            rows: Arc::new(postgres::PostgresRowRepo::new(pool.clone())),
        };
        Self {
            inner: PoolStorage::Postgres(pool),
            repos,
        }
    }

    #[cfg(feature = "database-mysql")]
    pub fn from_mysql(pool: sqlx::MySqlPool) -> Self {
        let repos = CachedRepos {
            catalog: Arc::new(mysql::MySqlCatalogRepo::new(pool.clone())),
            rows: Arc::new(mysql::MySqlRowRepo::new(pool.clone())),
        };
        Self {
            inner: PoolStorage::MySql(pool),
            repos,
        }
    }

    /// Create a database pool from configuration
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::None => Err(DbError::NotConfigured),
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .create_if_missing(cfg.create_if_missing)
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;

                tracing::debug!(path = %cfg.path, "Opened SQLite database");
                Ok(Self::from_sqlite(pool))
            }
            #[cfg(feature = "database-postgres")]
            DatabaseConfig::Postgres(cfg) => {
                use std::str::FromStr;

                use sqlx::postgres::PgSslMode;

                use crate::config::PostgresSslMode;

                let ssl_mode = match cfg.ssl_mode {
                    PostgresSslMode::Disable => PgSslMode::Disable,
                    PostgresSslMode::Prefer => PgSslMode::Prefer,
                    PostgresSslMode::Require => PgSslMode::Require,
                    PostgresSslMode::VerifyCa => PgSslMode::VerifyCa,
                    PostgresSslMode::VerifyFull => PgSslMode::VerifyFull,
                };
                let options = sqlx::postgres::PgConnectOptions::from_str(&cfg.url)?.ssl_mode(ssl_mode);

                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .acquire_timeout(std::time::Duration::from_secs(cfg.connect_timeout_secs))
                    .connect_with(options)
                    .await?;

                tracing::debug!("Connected to PostgreSQL");
                Ok(Self::from_postgres(pool))
            }
            #[cfg(feature = "database-mysql")]
            DatabaseConfig::MySql(cfg) => {
                let pool = sqlx::mysql::MySqlPoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .acquire_timeout(std::time::Duration::from_secs(cfg.connect_timeout_secs))
                    .connect(&cfg.url)
                    .await?;

                tracing::debug!("Connected to MySQL");
                Ok(Self::from_mysql(pool))
            }
        }
    }

    pub fn catalog(&self) -> Arc<dyn CatalogRepo> {
        self.repos.catalog.clone()
    }

    pub fn rows(&self) -> Arc<dyn RowRepo> {
        self.repos.rows.clone()
    }

    /// SQL dialect of the connected backend
    pub fn dialect(&self) -> SqlDialect {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(_) => SqlDialect::Sqlite,
            #[cfg(feature = "database-postgres")]
            PoolStorage::Postgres(_) => SqlDialect::Postgres,
            #[cfg(feature = "database-mysql")]
            PoolStorage::MySql(_) => SqlDialect::MySql,
            #[cfg(not(any(
                feature = "database-sqlite",
                feature = "database-postgres",
                feature = "database-mysql"
            )))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }

    /// Health check for database connectivity
    pub async fn health_check(&self) -> DbResult<()> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            #[cfg(feature = "database-postgres")]
            PoolStorage::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            #[cfg(feature = "database-mysql")]
            PoolStorage::MySql(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            #[cfg(not(any(
                feature = "database-sqlite",
                feature = "database-postgres",
                feature = "database-mysql"
            )))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }

    /// Close every connection. Waits for in-flight queries to finish.
    pub async fn close(&self) {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => pool.close().await,
            #[cfg(feature = "database-postgres")]
            PoolStorage::Postgres(pool) => pool.close().await,
            #[cfg(feature = "database-mysql")]
            PoolStorage::MySql(pool) => pool.close().await,
            #[cfg(not(any(
                feature = "database-sqlite",
                feature = "database-postgres",
                feature = "database-mysql"
            )))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }
}
